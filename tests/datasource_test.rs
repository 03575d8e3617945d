use assert_fs::prelude::*;
use predicates::prelude::*;
use std::fs;

use paper_rag::datasource::{save_pdf_bytes, ArxivSource, LocalSource, PdfSource};

#[test]
fn test_saved_pdf_bytes_match_response_body() {
    let temp = assert_fs::TempDir::new().unwrap();

    // Stand-in for a downloaded response body, including non-UTF8 bytes
    let body: Vec<u8> = b"%PDF-1.4\n\xde\xad\xbe\xef\n%%EOF".to_vec();

    let path = save_pdf_bytes(temp.path(), "2401.12345.pdf", &body).unwrap();

    temp.child("2401.12345.pdf").assert(predicate::path::exists());
    assert_eq!(fs::read(&path).unwrap(), body);
}

#[tokio::test]
async fn test_local_source_copies_file_byte_exact() {
    let temp = assert_fs::TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();

    let original = temp.child("paper.pdf");
    original.write_binary(b"%PDF-1.4 fake content %%EOF").unwrap();

    let source = LocalSource::new(original.path()).unwrap();
    let copied = source.fetch(dest.path()).await.unwrap();

    dest.child("paper.pdf").assert(predicate::path::exists());
    assert_eq!(
        fs::read(&copied).unwrap(),
        fs::read(original.path()).unwrap()
    );
    assert_eq!(source.label(), "paper.pdf");
}

#[tokio::test]
async fn test_invalid_arxiv_id_fails_before_any_download() {
    assert!(ArxivSource::new("definitely not an id").is_err());
    assert!(ArxivSource::new("https://arxiv.org/pdf/2401.12345.pdf").is_err());
}
