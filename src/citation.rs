/// Structured fields pulled out of a free-text journal reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    pub journal: String,
    pub volume: String,
    pub pages: String,
    pub year: String,
}

impl ParsedReference {
    fn from_parts(journal: &str, volume: &str, pages: &str, year: &str) -> Option<Self> {
        let journal = journal.trim();
        let volume = volume.trim();
        let pages = pages.trim();
        let year = year.trim();
        if journal.is_empty() || volume.is_empty() || pages.is_empty() || year.is_empty() {
            return None;
        }
        Some(ParsedReference {
            journal: journal.to_string(),
            volume: volume.to_string(),
            pages: pages.to_string(),
            year: year.to_string(),
        })
    }
}

/// Best-effort extraction of journal/volume/pages/year from the `journal_ref`
/// strings arXiv passes through from submitters. The format is whatever the
/// submitter typed, so this is a chain of punctuation heuristics; a miss
/// returns None and the caller falls back to the arXiv metadata. The exact
/// branch order is relied on downstream, so resist the urge to be smarter
/// here.
///
/// Shapes handled:
///   "Phys. Rev. Lett. 102 (2009) 110502"
///   "Phys. Rev. A 86, 032324 (2012)"
///   "International Journal of Quantum Information, 8:1-27 (2010)"
///   "New J. Phys. 14:123011, 2012"
pub fn parse_ref(reference: &str) -> Option<ParsedReference> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    // Concatenated references: keep the first, drop the rest.
    if let Some((first, _rest)) = reference.split_once(';') {
        return parse_ref(first);
    }

    if reference.contains('(') {
        let outer: Vec<&str> = reference.split('(').collect();
        let inner: Vec<&str> = outer[1].split(')').collect();
        // Unbalanced parentheses: nothing more can be salvaged.
        let trailing = *inner.get(1)?;
        let year = inner[0];

        let (journal, volume, pages) = if !trailing.is_empty() {
            // Pages after the year: "Phys. Rev. Lett. 102 (2009) 110502"
            let mut words: Vec<&str> = outer[0].split_whitespace().collect();
            let volume = words.pop()?;
            (words.join(" "), volume.to_string(), trailing.to_string())
        } else if reference.contains(',') {
            let segments: Vec<&str> = outer[0].split(',').collect();
            if reference.contains(':') {
                // "International Journal of Quantum Information, 8:1-27 (2010)"
                let pieces: Vec<&str> = segments.get(1)?.split(':').collect();
                let pages = *pieces.get(1)?;
                (segments[0].to_string(), pieces[0].to_string(), pages.to_string())
            } else {
                // "Phys. Rev. A 86, 032324 (2012)"
                let mut words: Vec<&str> = segments[0].split_whitespace().collect();
                let volume = words.pop()?;
                let pages = *segments.get(1)?;
                (words.join(" "), volume.to_string(), pages.to_string())
            }
        } else {
            // A year with nothing else recognizable in front of it.
            return None;
        };

        if let Some(parsed) = ParsedReference::from_parts(&journal, &volume, &pages, year) {
            return Some(parsed);
        }
        // All pieces were found but some were blank; the colon form below may
        // still apply.
    }

    if reference.contains(':') {
        // "New J. Phys. 14:123011, 2012" -- no volume to be split out.
        let halves: Vec<&str> = reference.split(':').collect();
        let info: Vec<&str> = halves[1].split(',').collect();
        let journal = halves[0].trim();
        let pages = info[0].trim();
        let year = info.get(1)?.trim();
        if !journal.is_empty() && !pages.is_empty() && !year.is_empty() {
            return Some(ParsedReference {
                journal: journal.to_string(),
                volume: String::new(),
                pages: pages.to_string(),
                year: year.to_string(),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(journal: &str, volume: &str, pages: &str, year: &str) -> ParsedReference {
        ParsedReference {
            journal: journal.to_string(),
            volume: volume.to_string(),
            pages: pages.to_string(),
            year: year.to_string(),
        }
    }

    #[test]
    fn comma_before_year_in_parens() {
        assert_eq!(
            parse_ref("Phys. Rev. A 86, 032324 (2012)"),
            Some(parsed("Phys. Rev. A", "86", "032324", "2012"))
        );
    }

    #[test]
    fn pages_trailing_after_parens() {
        assert_eq!(
            parse_ref("Phys. Rev. Lett. 102 (2009) 110502"),
            Some(parsed("Phys. Rev. Lett.", "102", "110502", "2009"))
        );
    }

    #[test]
    fn colon_volume_pages_before_parens() {
        assert_eq!(
            parse_ref("International Journal of Quantum Information, 8:1-27 (2010)"),
            Some(parsed("International Journal of Quantum Information", "8", "1-27", "2010"))
        );
    }

    #[test]
    fn bare_colon_form_has_no_volume() {
        // The colon branch never splits a volume off the journal text.
        assert_eq!(
            parse_ref("New J. Phys. 14:123011, 2012"),
            Some(parsed("New J. Phys. 14", "", "123011", "2012"))
        );
    }

    #[test]
    fn empty_and_blank_input_miss() {
        assert_eq!(parse_ref(""), None);
        assert_eq!(parse_ref("   "), None);
    }

    #[test]
    fn arxiv_fallback_refs_miss() {
        // No comma after the colon, so there is no year to pull out.
        assert_eq!(parse_ref("arXiv:1208.0928"), None);
    }

    #[test]
    fn unbalanced_parentheses_miss() {
        assert_eq!(parse_ref("Phys. Rev. A 86, 032324 (2012"), None);
        // The abort also skips the colon heuristic entirely.
        assert_eq!(parse_ref("NJP 5:123, 2004 ("), None);
    }

    #[test]
    fn year_only_references_miss() {
        assert_eq!(parse_ref("Phys. Rev. A 86 (2012)"), None);
        assert_eq!(parse_ref("(2012)"), None);
    }

    #[test]
    fn semicolon_keeps_only_the_first_reference() {
        assert_eq!(
            parse_ref("Phys. Rev. A 86, 032324 (2012); Phys. Rev. B 1, 100 (2013)"),
            Some(parsed("Phys. Rev. A", "86", "032324", "2012"))
        );
        assert_eq!(parse_ref("see erratum; Phys. Rev. A 86, 032324 (2012)"), None);
    }

    #[test]
    fn paren_miss_still_reaches_the_colon_form() {
        // Single word before the parens, so the paren branch assigns an empty
        // journal and falls through instead of aborting.
        assert_eq!(
            parse_ref("Vol:12 (2004) 100, 2004"),
            Some(parsed("Vol", "", "12 (2004) 100", "2004"))
        );
    }
}
