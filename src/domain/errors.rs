#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    UnknownField(String),
    UnknownColumn(String),
    RowOutOfRange { row: usize },
    RowLimitReached { max_rows: usize },
    MinimumRowsRequired,
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::UnknownField(key) => {
                write!(f, "Unknown field: {}", key)
            }
            DomainError::UnknownColumn(key) => {
                write!(f, "Unknown table column: {}", key)
            }
            DomainError::RowOutOfRange { row } => {
                write!(f, "Row out of range: {}", row)
            }
            DomainError::RowLimitReached { max_rows } => {
                write!(f, "Tối đa {} dòng cho bảng này", max_rows)
            }
            DomainError::MinimumRowsRequired => {
                write!(f, "Phải có ít nhất 1 dòng trong bảng")
            }
        }
    }
}

impl std::error::Error for DomainError {}

pub type DomainResult<T> = Result<T, DomainError>;
