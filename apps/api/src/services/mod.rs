pub mod gemini;
pub mod google_books;
pub mod job_poller;
pub mod library;
pub mod prompt_synthesizer;
pub mod replicate;
pub mod soundtrack;
pub mod storage;

// Re-export public types
pub use gemini::{GeminiClient, TextGenerator};
pub use google_books::{BookCatalog, GoogleBooksClient};
pub use job_poller::{JobPoller, PollSettings};
pub use library::{LibraryRecord, LibraryRepository, LibraryService};
pub use prompt_synthesizer::PromptSynthesizer;
pub use replicate::{JobService, ReplicateClient};
pub use soundtrack::SoundtrackService;
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
