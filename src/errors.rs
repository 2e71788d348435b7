use thiserror::Error;

/// 空选择时展示给用户的提示
pub const NO_SELECTION_MESSAGE: &str = "Please select at least one company.";

/// 其余所有失败统一展示的提示
pub const GENERIC_FAILURE_MESSAGE: &str = "Something appears to have gone wrong.";

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    ArrowError(String),

    #[error("Data source error: {0}")]
    DataSourceError(String),

    #[error("No company selected")]
    NoSelectionError,

    #[error("Unknown company: {0}")]
    UnknownCompanyError(String),

    #[error("Duplicate company row: {0}")]
    DuplicateCompany(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// 失败类别，前端按类别选择提示文案
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    DataSource,
    NoSelection,
    UnknownCompany,
    InvalidInput,
    Internal,
}

impl DashboardError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DashboardError::RequestError(_)
            | DashboardError::JsonError(_)
            | DashboardError::DataSourceError(_) => FailureKind::DataSource,
            DashboardError::NoSelectionError => FailureKind::NoSelection,
            DashboardError::UnknownCompanyError(_) => FailureKind::UnknownCompany,
            DashboardError::ConfigError(_) => FailureKind::InvalidInput,
            DashboardError::IoError(_)
            | DashboardError::ArrowError(_)
            | DashboardError::DuplicateCompany(_)
            | DashboardError::Unknown(_) => FailureKind::Internal,
        }
    }

    /// 面向用户的提示。只有空选择有专门文案，其它失败全部折叠成同一句。
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            FailureKind::NoSelection => NO_SELECTION_MESSAGE,
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

// 用于从字符串创建错误
impl From<String> for DashboardError {
    fn from(s: String) -> Self {
        DashboardError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for DashboardError {
    fn from(s: &str) -> Self {
        DashboardError::Unknown(s.to_string())
    }
}
