/// Reader and writer settings, loadable with serde.
pub mod options;

/// CSV automaton, reader and writer.
pub mod csv;

/// TSV reader and writer.
pub mod tsv;

/// Extension-based dispatch and header-aware reading.
pub mod xsv;
