//! Database table descriptors extracted from schema documents

use serde::{Deserialize, Serialize};

/// A single column of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Column name
    pub name: String,

    /// Declared type ("varchar", "bigint", "enum", ...)
    #[serde(rename = "type", default)]
    pub field_type: String,

    /// Declared length or precision
    #[serde(default)]
    pub length: Option<u32>,

    /// Declared scale (for decimal types)
    #[serde(default)]
    pub scale: Option<u32>,

    /// Whether NULL is allowed
    #[serde(default = "default_nullable")]
    pub nullable: bool,

    /// Primary-key flag
    #[serde(default, alias = "isPrimaryKey")]
    pub is_primary_key: bool,

    /// Auto-increment flag
    #[serde(default, alias = "isAutoIncrement")]
    pub is_auto_increment: bool,

    /// Declared default value, verbatim
    #[serde(default, alias = "defaultValue")]
    pub default_value: Option<String>,

    /// Column comment
    #[serde(default)]
    pub comment: String,

    /// Candidate values for enumeration-typed columns
    #[serde(default, alias = "enumValues")]
    pub enum_values: Option<Vec<String>>,
}

fn default_nullable() -> bool {
    true
}

impl FieldSpec {
    /// Create a field with the given name and type; everything else defaulted
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            length: None,
            scale: None,
            nullable: true,
            is_primary_key: false,
            is_auto_increment: false,
            default_value: None,
            comment: String::new(),
            enum_values: None,
        }
    }
}

/// Index classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexKind {
    /// Plain secondary index
    Index,
    /// Unique index
    Unique,
    /// Primary key index
    Primary,
    /// Full-text index
    Fulltext,
    /// Foreign-key backing index
    Foreign,
}

/// A table index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name
    pub name: String,

    /// Index classification
    #[serde(rename = "type")]
    pub kind: IndexKind,

    /// Indexed columns, in order
    pub fields: Vec<String>,

    /// Uniqueness flag
    #[serde(default, alias = "isUnique")]
    pub is_unique: bool,
}

/// Constraint classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintKind {
    /// Foreign-key reference
    ForeignKey,
    /// Column uniqueness
    Unique,
}

/// A table constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    /// Constraint classification
    #[serde(rename = "type")]
    pub kind: ConstraintKind,

    /// Constrained column
    pub column: String,

    /// Referenced table (foreign keys)
    #[serde(default, alias = "referencedTable")]
    pub referenced_table: Option<String>,

    /// Referenced column (foreign keys)
    #[serde(default, alias = "referencedColumn")]
    pub referenced_column: Option<String>,
}

/// A structured database table descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name as declared
    pub name: String,

    /// Human-readable title
    #[serde(default, alias = "displayName")]
    pub display_name: String,

    /// Table comment
    #[serde(default)]
    pub comment: String,

    /// Storage engine, when declared
    #[serde(default)]
    pub engine: Option<String>,

    /// Character set, when declared
    #[serde(default)]
    pub charset: Option<String>,

    /// Ordered column list
    #[serde(default)]
    pub fields: Vec<FieldSpec>,

    /// Index list
    #[serde(default)]
    pub indexes: Vec<IndexSpec>,

    /// Constraint list
    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,
}

impl TableSchema {
    /// Create an empty table descriptor
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            comment: String::new(),
            engine: None,
            charset: None,
            fields: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Case-insensitive identity key: the table name
    pub fn identity_key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

impl ConstraintSpec {
    /// Dedup key within one table's constraint list
    pub fn identity_key(&self) -> String {
        format!(
            "{:?}:{}:{}:{}",
            self.kind,
            self.column.to_lowercase(),
            self.referenced_table.as_deref().unwrap_or("").to_lowercase(),
            self.referenced_column.as_deref().unwrap_or("").to_lowercase(),
        )
    }
}
