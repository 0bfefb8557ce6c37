//! crates/codelab_core/src/languages.rs
//!
//! Programming languages supported by the Judge0 execution provider, keyed by
//! Judge0 language id and by the editor's language identifier.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Judge0 `language_id`.
    pub id: i64,
    pub name: &'static str,
    pub editor_id: &'static str,
    pub extension: &'static str,
}

const fn lang(id: i64, name: &'static str, editor_id: &'static str, extension: &'static str) -> Language {
    Language { id, name, editor_id, extension }
}

pub const LANGUAGES: &[Language] = &[
    lang(63, "JavaScript", "javascript", "js"),
    lang(71, "Python", "python", "py"),
    lang(62, "Java", "java", "java"),
    lang(54, "C++", "cpp", "cpp"),
    lang(50, "C", "c", "c"),
    lang(51, "C#", "csharp", "cs"),
    lang(78, "Kotlin", "kotlin", "kt"),
    lang(68, "PHP", "php", "php"),
    lang(72, "Ruby", "ruby", "rb"),
    lang(73, "Rust", "rust", "rs"),
    lang(74, "TypeScript", "typescript", "ts"),
    lang(60, "Go", "go", "go"),
    lang(82, "SQL", "sql", "sql"),
    lang(75, "Swift", "swift", "swift"),
    lang(83, "Scala", "scala", "scala"),
    lang(70, "Perl", "perl", "pl"),
    lang(80, "R", "r", "r"),
    lang(43, "Plain Text", "plaintext", "txt"),
];

pub fn by_id(id: i64) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.id == id)
}
