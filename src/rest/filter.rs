//! Row filters rendered as REST query parameters

/// Operator for filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to
    Eq,

    /// Not equal to
    Neq,

    /// `IS` (null, true, false)
    Is,
}

impl FilterOperator {
    /// Convert the operator to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Is => "is",
        }
    }
}

/// A single column condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub operator: FilterOperator,
    pub value: String,
    pub negated: bool,
}

impl Filter {
    pub fn new(column: &str, operator: FilterOperator, value: impl ToString) -> Self {
        Self {
            column: column.to_string(),
            operator,
            value: value.to_string(),
            negated: false,
        }
    }

    pub fn eq(column: &str, value: impl ToString) -> Self {
        Self::new(column, FilterOperator::Eq, value)
    }

    pub fn neq(column: &str, value: impl ToString) -> Self {
        Self::new(column, FilterOperator::Neq, value)
    }

    pub fn is_null(column: &str) -> Self {
        Self::new(column, FilterOperator::Is, "null")
    }

    /// Invert the condition (`not.` prefix)
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// `op.value`, with `not.` when negated
    fn expression(&self) -> String {
        let prefix = if self.negated { "not." } else { "" };
        format!("{}{}.{}", prefix, self.operator.as_str(), self.value)
    }

    /// Render as a `(column, expression)` query pair
    pub fn to_param(&self) -> (String, String) {
        (self.column.clone(), self.expression())
    }

    /// Render inside an `or=(...)` group, where the column is inlined
    fn to_group_member(&self) -> String {
        format!("{}.{}", self.column, self.expression())
    }
}

/// Render a disjunction of filters as an `or` query pair
pub fn or_group(filters: &[Filter]) -> (String, String) {
    let members: Vec<String> = filters.iter().map(Filter::to_group_member).collect();
    ("or".to_string(), format!("({})", members.join(",")))
}
