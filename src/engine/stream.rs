use std::collections::BTreeMap;

/// Ordered buffer of pipe-delimited records plus the per-record-type count
/// table the control block is synthesized from.
///
/// Each generated file owns exactly one `RecordStream`; nothing is shared
/// across invocations, so generating filings for two companies concurrently
/// is safe as long as each call builds its own stream.
///
/// Lifecycle: the layout module [`write`](Self::write)s every body record in
/// emission order, then calls [`finish`](Self::finish) once with the
/// layout's block order. `finish` inserts the `x990` closing record of each
/// block and appends the block 9 control records, whose counts include
/// themselves.
#[derive(Debug, Default)]
pub struct RecordStream {
    lines: Vec<String>,
    counts: BTreeMap<String, u32>,
}

impl RecordStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record: `|record_type|field|…|field|`.
    ///
    /// The delimiter is written at both ends of the line and between every
    /// field, so empty leading/trailing fields stay representable. The
    /// record-type count table is bumped as a side effect. Cannot fail:
    /// fields are already-formatted strings.
    pub fn write(&mut self, record_type: &str, fields: &[&str]) {
        let mut line = String::with_capacity(2 + record_type.len() + fields.len() * 8);
        line.push('|');
        line.push_str(record_type);
        for field in fields {
            line.push('|');
            line.push_str(field);
        }
        line.push('|');
        self.lines.push(line);
        *self.counts.entry(record_type.to_string()).or_insert(0) += 1;
    }

    /// Number of lines emitted so far.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when no record has been emitted yet.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// How many records of `record_type` have been emitted.
    pub fn count_of(&self, record_type: &str) -> u32 {
        self.counts.get(record_type).copied().unwrap_or(0)
    }

    /// Close every body block and append the control block, consuming the
    /// stream and returning the finished file text.
    ///
    /// `block_order` is the layout's fixed block sequence (without block 9).
    /// Every block whose opener was emitted is closed in place; since each
    /// layout unconditionally emits every opener, every listed block gets a
    /// closing record even when it carries no movement.
    pub fn finish(mut self, block_order: &[char]) -> String {
        for &block in block_order {
            self.close_block(block);
        }
        self.write_control_block();
        self.lines.join("\n")
    }

    /// Insert `|x990|n+1|` immediately after block `x`'s last line, where
    /// `n` is the number of lines currently in the block. The closing record
    /// counts itself, hence the `+1`.
    fn close_block(&mut self, block: char) {
        let in_block = |line: &String| line.as_bytes().get(1) == Some(&(block as u8));
        let Some(last) = self.lines.iter().rposition(|l| in_block(l)) else {
            return;
        };
        let count = self.lines.iter().filter(|l| in_block(l)).count();
        let record_type = format!("{block}990");
        self.lines
            .insert(last + 1, format!("|{record_type}|{}|", count + 1));
        *self.counts.entry(record_type).or_insert(0) += 1;
    }

    /// Emit block 9: opener, one `9900` tally per record type, block
    /// closing, and the final total-line record.
    ///
    /// The tally of the block's own record types is a fixed point — the
    /// count of `9900` lines depends on how many `9900` lines will exist.
    /// Taking the count-table snapshot before the block's first record
    /// resolves it: the `9900` total is the number of distinct types seen so
    /// far plus the four trailer-only types (9001, 9900, 9990, 9999), each
    /// of which gets exactly one tally line.
    fn write_control_block(&mut self) {
        let tally: Vec<(String, u32)> = self
            .counts
            .iter()
            .map(|(t, c)| (t.clone(), *c))
            .collect();
        let block_start = self.lines.len();

        self.write("9001", &["0"]);
        for (record_type, count) in &tally {
            self.write("9900", &[record_type, &count.to_string()]);
        }
        self.write("9900", &["9001", "1"]);
        self.write("9900", &["9900", &(tally.len() + 4).to_string()]);
        self.write("9900", &["9990", "1"]);
        self.write("9900", &["9999", "1"]);

        let block_lines = self.lines.len() - block_start;
        self.write("9990", &[&(block_lines + 1).to_string()]);
        self.write("9999", &[&(self.lines.len() + 1).to_string()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_builds_bounded_delimited_line() {
        let mut stream = RecordStream::new();
        stream.write("0000", &["018", "", "abc"]);
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.count_of("0000"), 1);
        let text = stream.finish(&[]);
        assert!(text.starts_with("|0000|018||abc|\n"));
    }

    #[test]
    fn close_block_counts_itself() {
        let mut stream = RecordStream::new();
        stream.write("C001", &["0"]);
        stream.write("C100", &["1"]);
        stream.write("C100", &["2"]);
        let text = stream.finish(&['C']);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[3], "|C990|4|");
    }

    #[test]
    fn closing_lands_before_next_block() {
        let mut stream = RecordStream::new();
        stream.write("0001", &["0"]);
        stream.write("C001", &["1"]);
        let text = stream.finish(&['0', 'C']);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "|0001|0|");
        assert_eq!(lines[1], "|0990|2|");
        assert_eq!(lines[2], "|C001|1|");
        assert_eq!(lines[3], "|C990|2|");
    }

    #[test]
    fn absent_block_is_skipped() {
        let mut stream = RecordStream::new();
        stream.write("0001", &["0"]);
        let text = stream.finish(&['0', 'H']);
        assert!(!text.contains("|H990|"));
    }

    #[test]
    fn final_record_states_total_line_count() {
        let mut stream = RecordStream::new();
        stream.write("0001", &["0"]);
        stream.write("C001", &["1"]);
        let text = stream.finish(&['0', 'C']);
        let lines: Vec<&str> = text.lines().collect();
        let declared: usize = lines
            .last()
            .unwrap()
            .trim_matches('|')
            .strip_prefix("9999|")
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(declared, lines.len());
    }

    #[test]
    fn control_block_tallies_every_type_once() {
        let mut stream = RecordStream::new();
        stream.write("0001", &["0"]);
        stream.write("C001", &["0"]);
        stream.write("C100", &["x"]);
        let text = stream.finish(&['0', 'C']);
        let lines: Vec<&str> = text.lines().collect();

        for line in &lines {
            let fields: Vec<&str> = line.trim_matches('|').split('|').collect();
            if fields[0] != "9900" {
                continue;
            }
            let declared: usize = fields[2].parse().unwrap();
            let actual = lines
                .iter()
                .filter(|l| l.starts_with(&format!("|{}|", fields[1])))
                .count();
            assert_eq!(declared, actual, "tally mismatch for {}", fields[1]);
        }
    }
}
