pub mod gemini_client;
pub mod reqwest_media_fetcher;
