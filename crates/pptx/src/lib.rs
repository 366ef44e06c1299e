//! PowerPoint (.pptx) slide backend.
//!
//! Decks are assembled in memory on a template package, either the built-in
//! 16:9 template or a user supplied .pptx/.potx, and written out in one go
//! when the deck is finalized.

mod deck;
mod media;
mod package;
mod slide;
mod template;

pub use deck::PptxDeck;
