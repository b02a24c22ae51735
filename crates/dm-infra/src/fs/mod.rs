mod document_saver;

pub use document_saver::FsDocumentSaver;
