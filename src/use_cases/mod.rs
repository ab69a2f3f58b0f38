pub mod ingest_content;
