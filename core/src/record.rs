//! One report row: account context, populated fields, and (once) an id.
//!
//! Lifecycle: `Record::new` with the owning accounts, fields populated from
//! the CSV pairs, `identity::assign_id` exactly once, then persistence. Once
//! the id is set the record's fields are frozen.

use crate::{
    error::{IdentityError, ReportError, ReportResult},
    field::FieldValue,
    record_type::RecordType,
    types::{AccountId, RecordId},
};
use std::collections::HashMap;

static ABSENT: FieldValue = FieldValue::Absent;

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    top_account_id: AccountId,
    account_id: AccountId,
    id: Option<RecordId>,
    values: HashMap<&'static str, FieldValue>,
    rejected_fields: Vec<&'static str>,
}

impl Record {
    pub fn new(top_account_id: AccountId, account_id: AccountId) -> Self {
        Self {
            top_account_id,
            account_id,
            id: None,
            values: HashMap::new(),
            rejected_fields: Vec::new(),
        }
    }

    pub fn top_account_id(&self) -> AccountId {
        self.top_account_id
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Value of a field; unset fields read as `FieldValue::Absent`.
    pub fn get(&self, semantic_name: &str) -> &FieldValue {
        self.values.get(semantic_name).unwrap_or(&ABSENT)
    }

    /// Set a field from code.
    pub fn set(
        &mut self,
        record_type: &RecordType,
        semantic_name: &str,
        value: FieldValue,
    ) -> ReportResult<()> {
        self.ensure_unidentified()?;
        let mapping = record_type.field(semantic_name).ok_or_else(|| {
            ReportError::configuration(
                record_type.name(),
                format!("no field named '{semantic_name}'"),
            )
        })?;
        self.values.insert(mapping.semantic_name, value);
        Ok(())
    }

    /// Populate from `(external field key, raw text)` pairs.
    ///
    /// Unknown keys are ignored. A cell that does not parse leaves its field
    /// absent and flags the record incomplete; the errors are returned so
    /// the caller can count and log them.
    pub fn populate<K, V>(
        &mut self,
        record_type: &RecordType,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> ReportResult<Vec<ReportError>>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.ensure_unidentified()?;
        let mut format_errors = Vec::new();
        for (key, raw) in pairs {
            let Some(mapping) = record_type.field_by_external_key(key.as_ref()) else {
                continue;
            };
            match mapping.parse(raw.as_ref()) {
                Ok(value) => {
                    self.values.insert(mapping.semantic_name, value);
                }
                Err(e) => {
                    self.values.insert(mapping.semantic_name, FieldValue::Absent);
                    if !self.rejected_fields.contains(&mapping.semantic_name) {
                        self.rejected_fields.push(mapping.semantic_name);
                    }
                    format_errors.push(e);
                }
            }
        }
        Ok(format_errors)
    }

    /// True when at least one cell failed to parse.
    pub fn is_incomplete(&self) -> bool {
        !self.rejected_fields.is_empty()
    }

    pub fn rejected_fields(&self) -> &[&'static str] {
        &self.rejected_fields
    }

    pub(crate) fn identify(&mut self, id: RecordId) -> ReportResult<()> {
        self.ensure_unidentified()?;
        self.id = Some(id);
        Ok(())
    }

    fn ensure_unidentified(&self) -> ReportResult<()> {
        match &self.id {
            Some(id) => Err(IdentityError::AlreadyAssigned { id: id.clone() }.into()),
            None => Ok(()),
        }
    }
}
