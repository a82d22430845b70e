use std::{
    fs::OpenOptions,
    io::{self, Write},
};

// Utils to accumulate exported references on the local device.
pub struct LocalSaver;

impl LocalSaver {
    /// Append BibTeX entries to the export file, one blank line between
    /// entries. The file accumulates across runs.
    pub fn append_bibtex(fname: &str, entries: &[String]) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(fname)?;
        entries.iter().try_for_each(|entry| -> io::Result<()> {
            file.write_all(entry.as_bytes())?;
            file.write_all(b"\n")?;
            Ok(())
        })?;
        file.flush()?;
        Ok(())
    }
}
