use serde::Deserialize;

/// Error body returned by the REST store on a rejected request.
#[derive(Debug, Deserialize)]
pub struct StoreErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl StoreErrorBody {
    pub fn describe(&self) -> String {
        let mut text = self.message.clone();
        if let Some(code) = &self.code {
            text = format!("[{}] {}", code, text);
        }
        if let Some(details) = &self.details {
            text.push_str(&format!(" ({})", details));
        }
        if let Some(hint) = &self.hint {
            text.push_str(&format!(" hint: {}", hint));
        }
        text
    }
}
