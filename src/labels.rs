//! Field label dictionary.
//!
//! Every vendor label, key synonym and substring hint the extractors know about
//! lives here. Add new vendor vocabulary to this table, not inline in the
//! extraction code.

/// Semantic field an OCR label can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    FullName,
    IdNumber,
    DocumentType,
}

/// Fields reported in an `ExtractionResult`, in lookup order.
pub const RESULT_FIELDS: [Field; 3] = [Field::FullName, Field::IdNumber, Field::DocumentType];

/// Ordered direct keys probed on each candidate container.
pub fn direct_keys(field: Field) -> &'static [&'static str] {
    match field {
        Field::FullName => &["name", "full_name", "FullName", "Name"],
        Field::IdNumber => &[
            "id_number",
            "document_number",
            "id",
            "DocumentNumber",
            "document_no",
        ],
        Field::DocumentType => &["document_type", "type", "doc_type", "DocumentType"],
        Field::FirstName | Field::LastName => &[],
    }
}

/// Lower-case substrings that make a free-form label count as this field.
pub fn label_hints(field: Field) -> &'static [&'static str] {
    match field {
        Field::FullName => &["name", "fullname", "givenname"],
        Field::IdNumber => &["id", "number", "cardno", "document"],
        Field::DocumentType => &["type", "document"],
        Field::FirstName | Field::LastName => &[],
    }
}

/// Exact (lower-case) prediction labels for the confidence-ranked picker.
pub fn prediction_labels(field: Field) -> &'static [&'static str] {
    match field {
        Field::FirstName => &[
            "first_name",
            "given_name",
            "given_names",
            "forename",
            "holder_first_name",
            "name_first",
        ],
        Field::LastName => &[
            "last_name",
            "surname",
            "family_name",
            "holder_last_name",
            "name_last",
        ],
        Field::FullName => &[
            "full_name",
            "fullname",
            "name",
            "holder_name",
            "complete_name",
        ],
        Field::IdNumber => &[
            "id_number",
            "document_number",
            "identification_number",
            "card_number",
            "number",
            "license_number",
            "driving_license_number",
            "passport_number",
            "aadhaar_number",
            "pan",
            "pan_number",
            "nric",
            "nin",
            "ic_number",
        ],
        Field::DocumentType => &["document_type", "id_type", "type", "doctype", "card_type"],
    }
}

/// Shape of a label/value list inside a provider container.
pub struct EntryShape {
    /// Container key holding the list.
    pub list_key: &'static str,
    /// Keys tried, in order, for the entry's label.
    pub label_keys: &'static [&'static str],
    /// Keys tried, in order, for the entry's value.
    pub value_keys: &'static [&'static str],
}

/// `fields: [{name|key, value|text|value_string|Value}]`
pub const FIELDS_LIST: EntryShape = EntryShape {
    list_key: "fields",
    label_keys: &["name", "key"],
    value_keys: &["value", "text", "value_string", "Value"],
};

/// `key_values: [{key, value|value_string|text}]`
pub const KEY_VALUES_LIST: EntryShape = EntryShape {
    list_key: "key_values",
    label_keys: &["key"],
    value_keys: &["value", "value_string", "text"],
};

/// Does a lower-cased label contain any hint for `field`?
pub fn label_matches(field: Field, label: &str) -> bool {
    label_hints(field).iter().any(|hint| label.contains(hint))
}
