use std::io::{self, BufRead};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

pub fn read_lines<R: BufRead>(reader: &mut R) -> io::Result<Vec<LineRecord>> {
    let mut lines = Vec::new();
    let mut buffer = String::new();
    let mut offset = 0usize;

    loop {
        buffer.clear();
        let bytes_read = reader.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }

        lines.push(LineRecord {
            text: strip_line_ending(&buffer).to_string(),
            start: offset,
            end: offset + bytes_read,
        });

        offset += bytes_read;
    }

    Ok(lines)
}

/// Same as [`read_lines`] for text already held in memory.
pub fn split_lines(text: &str) -> Vec<LineRecord> {
    let mut lines = Vec::new();
    let mut offset = 0usize;

    for raw in text.split_inclusive('\n') {
        lines.push(LineRecord {
            text: strip_line_ending(raw).to_string(),
            start: offset,
            end: offset + raw.len(),
        });
        offset += raw.len();
    }

    lines
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    #[test]
    fn reader_and_str_agree() {
        let text = "> ## Q1\r\n> - [ ] A. yes\n\n---\nlast";
        let mut reader = BufReader::new(Cursor::new(text.as_bytes()));
        let from_reader = read_lines(&mut reader).unwrap();
        assert_eq!(from_reader, split_lines(text));
        assert_eq!(from_reader[0].text, "> ## Q1");
        assert_eq!(from_reader[0].end, 9);
        assert_eq!(from_reader.last().unwrap().text, "last");
    }
}
