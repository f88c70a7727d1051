use std::fmt;

#[derive(Debug)]
pub enum CatalogError {
    Network(reqwest::Error),
    Http { status: u16, url: String },
    Json(serde_json::Error),
    InvalidProduct(String),
    Config(String),
    Io(std::io::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Network(e) => write!(f, "Network error: {}", e),
            CatalogError::Http { status, url } => {
                write!(f, "Request to {} failed with status {}", url, status)
            }
            CatalogError::Json(e) => write!(f, "JSON parsing error: {}", e),
            CatalogError::InvalidProduct(e) => write!(f, "Invalid product: {}", e),
            CatalogError::Config(e) => write!(f, "Configuration error: {}", e),
            CatalogError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Network(e) => Some(e),
            CatalogError::Json(e) => Some(e),
            CatalogError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Network(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Json(err)
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err)
    }
}
