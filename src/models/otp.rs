use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const OTP_LENGTH: usize = 6;

/// Marker stored once the OTP has been verified; gates the reset step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerification {
    pub verified: bool,
    pub temp_token: String,
}

/// The six single-digit boxes of the OTP form plus the focused box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpInput {
    #[serde(serialize_with = "serialize_digits", deserialize_with = "deserialize_digits")]
    digits: [Option<char>; OTP_LENGTH],
    focus: usize,
}

/// A key event on one OTP box, as sent by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum OtpKey {
    Type { index: usize, value: String },
    Backspace { index: usize },
    Paste { text: String },
}

impl OtpInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn digit(&self, index: usize) -> Option<char> {
        self.digits.get(index).copied().flatten()
    }

    /// Apply a key event. Returns false when the event was ignored.
    pub fn apply(&mut self, key: &OtpKey) -> bool {
        match key {
            OtpKey::Type { index, value } => self.type_char(*index, value),
            OtpKey::Backspace { index } => self.backspace(*index),
            OtpKey::Paste { text } => self.paste(text),
        }
    }

    /// Content typed into box `index`. Only the last character is kept and
    /// focus advances, never past the last box. Non-digit input is ignored.
    pub fn type_char(&mut self, index: usize, value: &str) -> bool {
        if index >= OTP_LENGTH || !value.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        self.digits[index] = value.chars().last();
        self.focus = if value.is_empty() { index } else { (index + 1).min(OTP_LENGTH - 1) };
        true
    }

    /// Backspace in box `index`: clears a filled box, otherwise moves focus back.
    pub fn backspace(&mut self, index: usize) -> bool {
        if index >= OTP_LENGTH {
            return false;
        }
        if self.digits[index].is_some() {
            self.digits[index] = None;
            self.focus = index;
            return true;
        }
        if index > 0 {
            self.focus = index - 1;
            return true;
        }
        false
    }

    /// Paste distributes exactly six digits over all boxes and focuses the last
    /// one. Any other digit count leaves the boxes untouched.
    pub fn paste(&mut self, text: &str) -> bool {
        let digits: Vec<char> = text.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != OTP_LENGTH {
            return false;
        }
        for (slot, d) in self.digits.iter_mut().zip(digits) {
            *slot = Some(d);
        }
        self.focus = OTP_LENGTH - 1;
        true
    }

    /// The full code, only when all six boxes are filled.
    pub fn code(&self) -> Option<String> {
        self.digits.iter().copied().collect::<Option<String>>()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn serialize_digits<S: Serializer>(digits: &[Option<char>; OTP_LENGTH], serializer: S) -> Result<S::Ok, S::Error> {
    let boxes: Vec<String> = digits.iter().map(|d| d.map(String::from).unwrap_or_default()).collect();
    boxes.serialize(serializer)
}

fn deserialize_digits<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[Option<char>; OTP_LENGTH], D::Error> {
    let boxes = Vec::<String>::deserialize(deserializer)?;
    let mut digits = [None; OTP_LENGTH];
    for (slot, text) in digits.iter_mut().zip(boxes) {
        *slot = text.chars().next().filter(char::is_ascii_digit);
    }
    Ok(digits)
}
