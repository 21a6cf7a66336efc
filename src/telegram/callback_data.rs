const REMOVE_PREFIX: &str = "remove_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Remove(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        let number = data.strip_prefix(REMOVE_PREFIX)?;
        if number.is_empty() {
            return None;
        }
        Some(Self::Remove(number.to_string()))
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Remove(number) => format!("{REMOVE_PREFIX}{number}"),
        }
    }
}
