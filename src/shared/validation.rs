use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Postal index number: exactly six digits
    /// - Valid: "560001", "110011"
    /// - Invalid: "56001", "5600011", "56O001", " 560001"
    pub static ref PINCODE_REGEX: Regex = Regex::new(r"^\d{6}$").unwrap();

    /// Base64 data URL prefix as produced by browser file readers
    /// - Captures the MIME type: "data:image/png;base64," -> "image/png"
    pub static ref DATA_URL_REGEX: Regex =
        Regex::new(r"^data:(?P<mime>[a-z]+/[a-z0-9.+-]+);base64,").unwrap();
}
