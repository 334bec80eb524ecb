/// One non-comment line of a result file, split into raw tokens.
///
/// Column meaning depends on the workload family; the row itself carries no
/// schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    /// 1-based line number in the source file, kept for error messages.
    pub line: usize,
    pub fields: Vec<String>,
}

impl ResultRow {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    pub fn field(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(String::as_str)
    }
}
