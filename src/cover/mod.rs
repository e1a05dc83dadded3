/// Cover image handling
///
/// This module handles:
/// - Decoding cover images and resizing them to card size (thumbnail.rs)
/// - Keeping decoded covers alive while their cards are shown (cache.rs)

pub mod cache;
pub mod thumbnail;
