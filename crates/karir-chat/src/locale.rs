//! User-facing strings (Bahasa Indonesia).

/// Shown in place of history when the conversation is empty.
pub const WELCOME: &str = "Halo! Saya AI Career Assistant KarirKita! 👋

Saya siap membantu Anda dengan:
• Tips CV ATS-friendly
• Persiapan interview
• Nasihat karir
• Pertanyaan seputar pekerjaan

Ada yang bisa saya bantu?";

/// Appended as a bot message when a completion fails.
pub const ERROR_REPLY: &str = "Maaf, terjadi kesalahan. Silakan coba lagi.";

/// Typing indicator label.
pub const TYPING: &str = "AI sedang mengetik";

/// Widget header title.
pub const TITLE: &str = "AI Career Assistant";

/// Input placeholder.
pub const PLACEHOLDER: &str = "Ketik pertanyaan Anda...";
