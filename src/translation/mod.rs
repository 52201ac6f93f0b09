/*!
 * DeepL API operations.
 *
 * Every operation is a method of [`Translator`]. The submodules group them:
 *
 * - `core`: the translator client and its options
 * - `text`: text translation
 * - `document`: upload, status polling and download of documents
 * - `batch`: fan-out of one text translation to many target languages
 * - `glossary`: glossary management
 * - `account`: usage and supported languages
 */

// Re-export main types for easier usage
pub use self::batch::{BatchResult, BatchTarget, BatchTranslator};
pub use self::core::{
    AppInfo, DEEPL_SERVER_URL, DEEPL_SERVER_URL_FREE, Translator, TranslatorOptions,
    is_free_account_auth_key,
};

pub use self::account::{Language, Usage, UsageDetail};
pub use self::document::{
    DocumentHandle, DocumentPolling, DocumentState, DocumentStatus, DocumentTranslateOptions,
    TranslatedDocument,
};
pub use self::glossary::{GlossaryEntries, GlossaryInfo, GlossaryLanguagePair};
pub use self::text::{Formality, SplitSentences, TagHandling, TextResult, TextTranslateOptions};

// Submodules
pub mod account;
pub mod batch;
pub mod core;
pub mod document;
pub mod glossary;
pub mod text;
