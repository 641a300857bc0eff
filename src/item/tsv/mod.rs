/// Tab-separated values: one record per line, fields split on tabs, no
/// quoting. The CSV automaton is not involved.
pub mod tsv_reader;

pub mod tsv_writer;
