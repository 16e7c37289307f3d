//! 会员登记
//!
//! 必填字段由 [`MemberSchema`] 策略决定，缺失字段一次性全部报告。
//! 唯一性 (email / nationalId) 交给存储层判断。

use std::str::FromStr;
use std::sync::Arc;

use shared::models::{Member, MemberCreate, MemberUpdate};
use shared::util::{non_blank, now_millis, prefixed_id};

use crate::db::{MemberFilter, RepoError, Repository};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN,
    missing_fields, parse_date, validate_email, validate_optional_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Required-field policy for new members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberSchema {
    /// First name, last name, email
    Basic,
    /// First name, last name plus the full identity/KYC set
    #[default]
    Extended,
}

impl MemberSchema {
    /// Required fields beyond first/last name, by wire name
    fn required(self) -> &'static [&'static str] {
        match self {
            MemberSchema::Basic => &["email"],
            MemberSchema::Extended => &[
                "dateOfBirth",
                "gender",
                "nationalId",
                "phone",
                "residentialAddress",
                "region",
                "level",
            ],
        }
    }

    fn requires(self, field: &str) -> bool {
        self.required().contains(&field)
    }
}

impl FromStr for MemberSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(MemberSchema::Basic),
            "extended" => Ok(MemberSchema::Extended),
            other => Err(format!("unknown member schema: {other}")),
        }
    }
}

fn member_not_found(id: &str) -> AppError {
    AppError::new(ErrorCode::MemberNotFound).with_detail("id", id)
}

#[derive(Clone)]
pub struct MemberRegistry {
    members: Arc<dyn Repository<Member>>,
    schema: MemberSchema,
}

impl MemberRegistry {
    pub fn new(members: Arc<dyn Repository<Member>>, schema: MemberSchema) -> Self {
        Self { members, schema }
    }

    /// All members, newest first, optionally narrowed by a search string
    pub async fn list(&self, query: Option<&str>) -> AppResult<Vec<Member>> {
        let filter = MemberFilter {
            search: non_blank(query).map(|q| q.to_lowercase()),
            ..Default::default()
        };
        Ok(self.members.find_many(&filter).await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<Member> {
        self.members
            .find_by_id(id)
            .await?
            .ok_or_else(|| member_not_found(id))
    }

    /// The member linked to the calling user
    pub async fn me(&self, member_id: Option<&str>) -> AppResult<Member> {
        let id = member_id.ok_or_else(|| AppError::new(ErrorCode::MemberNotLinked))?;
        self.get(id).await
    }

    pub async fn create(&self, input: MemberCreate) -> AppResult<Member> {
        let first_name = non_blank(input.first_name.as_deref());
        let last_name = non_blank(input.last_name.as_deref());
        let email = non_blank(input.email.as_deref());
        let phone = non_blank(input.phone.as_deref());
        let date_of_birth = non_blank(input.date_of_birth.as_deref());
        let national_id = non_blank(input.national_id.as_deref());
        let residential_address = non_blank(input.residential_address.as_deref());
        let region = non_blank(input.region.as_deref());

        let present = |field: &str| -> bool {
            match field {
                "email" => email.is_some(),
                "phone" => phone.is_some(),
                "dateOfBirth" => date_of_birth.is_some(),
                "gender" => input.gender.is_some(),
                "nationalId" => national_id.is_some(),
                "residentialAddress" => residential_address.is_some(),
                "region" => region.is_some(),
                "level" => input.level.is_some(),
                _ => true,
            }
        };

        let mut missing: Vec<&str> = Vec::new();
        if first_name.is_none() {
            missing.push("firstName");
        }
        if last_name.is_none() {
            missing.push("lastName");
        }
        missing.extend(self.schema.required().iter().copied().filter(|f| !present(*f)));
        if !missing.is_empty() {
            return Err(missing_fields(ErrorCode::MemberMissingFields, &missing));
        }

        if let Some(email) = &email {
            validate_email(email)?;
        }
        let date_of_birth = date_of_birth
            .as_deref()
            .map(|raw| parse_date(raw, "dateOfBirth"))
            .transpose()?;
        let outstanding_balance = input.outstanding_balance.unwrap_or(0.0);
        if !outstanding_balance.is_finite() {
            return Err(AppError::validation("outstandingBalance must be a finite number"));
        }

        let member = Member {
            id: prefixed_id("mem"),
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
            email,
            phone,
            date_of_birth,
            gender: input.gender,
            national_id,
            residential_address,
            region,
            occupation: non_blank(input.occupation.as_deref()),
            nationality: non_blank(input.nationality.as_deref()),
            level: input.level,
            category: non_blank(input.category.as_deref()),
            status: input.status.unwrap_or_default(),
            passport_picture_url: non_blank(input.passport_picture_url.as_deref()),
            outstanding_balance,
            created_at: now_millis(),
        };
        validate_lengths(&member)?;

        let member = self.members.insert(member).await?;
        tracing::info!(member_id = %member.id, "Member created");
        Ok(member)
    }

    /// Merge the provided fields into the stored member
    ///
    /// `id` and `createdAt` are never touched. An empty patch writes the
    /// record back unchanged.
    pub async fn update(&self, id: &str, patch: MemberUpdate) -> AppResult<Member> {
        let mut member = self.get(id).await?;

        if let Some(v) = patch.first_name {
            member.first_name = self.required_text(v, "firstName")?;
        }
        if let Some(v) = patch.last_name {
            member.last_name = self.required_text(v, "lastName")?;
        }
        if let Some(v) = patch.email {
            let email = self.optional_text(&v, "email")?;
            if let Some(email) = &email {
                validate_email(email)?;
            }
            member.email = email;
        }
        if let Some(v) = patch.phone {
            member.phone = self.optional_text(&v, "phone")?;
        }
        if let Some(v) = patch.date_of_birth {
            member.date_of_birth = self
                .optional_text(&v, "dateOfBirth")?
                .map(|raw| parse_date(&raw, "dateOfBirth"))
                .transpose()?;
        }
        if let Some(v) = patch.gender {
            member.gender = Some(v);
        }
        if let Some(v) = patch.national_id {
            member.national_id = self.optional_text(&v, "nationalId")?;
        }
        if let Some(v) = patch.residential_address {
            member.residential_address = self.optional_text(&v, "residentialAddress")?;
        }
        if let Some(v) = patch.region {
            member.region = self.optional_text(&v, "region")?;
        }
        if let Some(v) = patch.occupation {
            member.occupation = non_blank(Some(v.as_str()));
        }
        if let Some(v) = patch.nationality {
            member.nationality = non_blank(Some(v.as_str()));
        }
        if let Some(level) = patch.level {
            member.level = level;
        }
        if let Some(v) = patch.category {
            member.category = non_blank(Some(v.as_str()));
        }
        if let Some(status) = patch.status {
            member.status = status;
        }
        if let Some(url) = patch.passport_picture_url {
            member.passport_picture_url = url.and_then(|u| non_blank(Some(u.as_str())));
        }
        if let Some(balance) = patch.outstanding_balance {
            if !balance.is_finite() {
                return Err(AppError::validation("outstandingBalance must be a finite number"));
            }
            member.outstanding_balance = balance;
        }
        validate_lengths(&member)?;

        match self.members.update(member).await {
            Ok(member) => Ok(member),
            Err(RepoError::NotFound(_)) => Err(member_not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        match self.members.delete(id).await {
            Ok(()) => {
                tracing::info!(member_id = %id, "Member deleted");
                Ok(())
            }
            Err(RepoError::NotFound(_)) => Err(member_not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    fn required_text(&self, value: String, field: &str) -> AppResult<String> {
        non_blank(Some(value.as_str()))
            .ok_or_else(|| missing_fields(ErrorCode::MemberMissingFields, &[field]))
    }

    /// Blank clears the field, unless the schema requires it
    fn optional_text(&self, value: &str, field: &str) -> AppResult<Option<String>> {
        let value = non_blank(Some(value));
        if value.is_none() && self.schema.requires(field) {
            return Err(missing_fields(ErrorCode::MemberMissingFields, &[field]));
        }
        Ok(value)
    }
}

fn validate_lengths(m: &Member) -> AppResult<()> {
    validate_optional_text(&Some(m.first_name.clone()), "firstName", MAX_NAME_LEN)?;
    validate_optional_text(&Some(m.last_name.clone()), "lastName", MAX_NAME_LEN)?;
    validate_optional_text(&m.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&m.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&m.national_id, "nationalId", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&m.residential_address, "residentialAddress", MAX_ADDRESS_LEN)?;
    validate_optional_text(&m.region, "region", MAX_NAME_LEN)?;
    validate_optional_text(&m.occupation, "occupation", MAX_NAME_LEN)?;
    validate_optional_text(&m.nationality, "nationality", MAX_NAME_LEN)?;
    validate_optional_text(&m.category, "category", MAX_NAME_LEN)?;
    validate_optional_text(&m.passport_picture_url, "passportPictureUrl", MAX_URL_LEN)?;
    Ok(())
}
