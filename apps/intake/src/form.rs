use crate::errors::ValidationError;
use crate::fields::PoidField;

/// Multipart field name the backend reads the bill from.
pub const FILE_FIELD: &str = "utility_bill";

/// Everything the intake page collects besides the bill itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeForm {
    pub business_entity: String,
    pub account_name: String,
    pub contact_name: String,
    pub title: String,
    pub phone: String,
    pub email: String,
    pub service_addresses: String,
    pub developer_assigned: String,
    pub account_type: String,
    pub utility_provider: String,
    pub poid: String,
    pub agent_id: String,
    pub poa_agreement: bool,
}

impl IntakeForm {
    /// Local checks run before anything is sent. The POID rule follows the provider
    /// on the form itself.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.utility_provider.trim().is_empty() {
            return Err(ValidationError::MissingField("utility_provider"));
        }
        PoidField::for_provider(&self.utility_provider)
            .check(&self.utility_provider, &self.poid)?;
        if !self.poa_agreement {
            return Err(ValidationError::PoaNotAccepted);
        }
        Ok(())
    }

    /// Text parts in page order. Blank fields are still sent; an unchecked POA box is omitted,
    /// a checked one is sent as `on`.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("business_entity", self.business_entity.clone()),
            ("account_name", self.account_name.clone()),
            ("contact_name", self.contact_name.clone()),
            ("title", self.title.clone()),
            ("phone", self.phone.clone()),
            ("email", self.email.clone()),
            ("service_addresses", self.service_addresses.clone()),
            ("developer_assigned", self.developer_assigned.clone()),
            ("account_type", self.account_type.clone()),
            ("utility_provider", self.utility_provider.clone()),
            ("poid", self.poid.clone()),
            ("agent_id", self.agent_id.clone()),
        ];
        if self.poa_agreement {
            fields.push(("poa_agreement", "on".to_string()));
        }
        fields
    }
}
