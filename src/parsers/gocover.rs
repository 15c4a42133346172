/// Parser for Go's `-coverprofile` format.
///
/// Reference: https://go.dev/blog/cover
///
/// Format:
///   mode: set|count|atomic
///   <file>:<startLine>.<startCol>,<endLine>.<endCol> <numStatements> <count>
///
/// Each line describes a basic block with the number of statements in the
/// block and how many times it was executed. Blocks are kept at column
/// granularity because function attribution needs exact boundaries.
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use crate::error::{CovriskError, Result};
use crate::model::{CoverageBlock, Position, Profile, ProfileFile};

/// Read and parse a profile from disk.
pub fn parse_file(path: &Path) -> Result<Profile> {
    let content = std::fs::read(path)?;
    parse(&content)
}

/// Parse a Go coverage profile from raw bytes.
pub fn parse(input: &[u8]) -> Result<Profile> {
    parse_reader(&mut &*input)
}

fn parse_error(line: usize, message: impl Into<String>) -> CovriskError {
    CovriskError::ProfileParse {
        line,
        message: message.into(),
    }
}

/// Parse a `line.col` pair.
fn parse_position(s: &str) -> Option<Position> {
    let (line, col) = s.split_once('.')?;
    Some(Position::new(line.parse().ok()?, col.parse().ok()?))
}

/// Parse a single block line, returning (file_id, block).
///
/// Format: `<file>:<startLine>.<startCol>,<endLine>.<endCol> <numStmt> <count>`
fn parse_block_line(line: &str) -> Option<(&str, CoverageBlock)> {
    // The range part never contains a colon, so the last one separates it
    // from the file identifier.
    let colon_pos = line.rfind(':')?;

    let file = &line[..colon_pos];
    if file.is_empty() {
        return None;
    }
    let rest = &line[colon_pos + 1..];

    let mut parts = rest.split_whitespace();
    let range = parts.next()?;
    let num_stmt: u64 = parts.next()?.parse().ok()?;
    let count: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let (start, end) = range.split_once(',')?;

    Some((
        file,
        CoverageBlock {
            start: parse_position(start)?,
            end: parse_position(end)?,
            num_stmt,
            count,
        },
    ))
}

fn parse_reader(reader: &mut dyn BufRead) -> Result<Profile> {
    // Collect blocks grouped by file identifier, preserving first-seen order.
    let mut file_order: Vec<String> = Vec::new();
    let mut file_blocks: HashMap<String, Vec<CoverageBlock>> = HashMap::new();
    let mut mode: Option<String> = None;

    let mut raw_line = String::new();
    let mut line_no = 0;
    loop {
        raw_line.clear();
        let n = reader
            .read_line(&mut raw_line)
            .map_err(|e| parse_error(line_no + 1, format!("unreadable input: {e}")))?;
        if n == 0 {
            break;
        }
        line_no += 1;

        let line = raw_line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }

        if mode.is_none() {
            let m = line
                .strip_prefix("mode: ")
                .ok_or_else(|| parse_error(line_no, format!("bad mode line: {line}")))?;
            mode = Some(m.trim().to_string());
            continue;
        }

        let (file, block) = parse_block_line(line)
            .ok_or_else(|| parse_error(line_no, format!("line does not match block format: {line}")))?;
        if block.end < block.start {
            return Err(parse_error(
                line_no,
                format!("block ends at {} before it starts at {}", block.end, block.start),
            ));
        }

        if !file_blocks.contains_key(file) {
            file_order.push(file.to_string());
        }
        file_blocks.entry(file.to_string()).or_default().push(block);
    }

    let mode = mode.unwrap_or_default();
    let mut profile = Profile {
        mode: mode.clone(),
        files: Vec::with_capacity(file_order.len()),
    };

    for file_id in file_order {
        if let Some(blocks) = file_blocks.remove(&file_id) {
            profile.files.push(ProfileFile {
                file_id,
                blocks: normalize_blocks(blocks, &mode),
            });
        }
    }

    Ok(profile)
}

/// Sort blocks by start position and merge duplicates.
///
/// Profiles merged from several test binaries repeat the same block once
/// per binary. Counts are OR-ed in `set` mode and summed otherwise.
fn normalize_blocks(mut blocks: Vec<CoverageBlock>, mode: &str) -> Vec<CoverageBlock> {
    blocks.sort_by_key(|b| (b.start, b.end));

    let mut merged: Vec<CoverageBlock> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match merged.last_mut() {
            Some(last) if last.start == block.start && last.end == block.end => {
                if mode == "set" {
                    last.count = u64::from(last.count > 0 || block.count > 0);
                } else {
                    last.count = last.count.saturating_add(block.count);
                }
            }
            _ => merged.push(block),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gocover() {
        let input = b"mode: count\n\
            github.com/user/project/main.go:10.13,12.2 2 5\n\
            github.com/user/project/main.go:14.20,16.2 1 0\n\
            github.com/user/project/util.go:3.1,5.2 3 3\n";
        let profile = parse(input).unwrap();

        assert_eq!(profile.mode, "count");
        assert_eq!(profile.files.len(), 2);

        let main = &profile.files[0];
        assert_eq!(main.file_id, "github.com/user/project/main.go");
        assert_eq!(main.blocks.len(), 2);
        assert_eq!(main.blocks[0].start, Position::new(10, 13));
        assert_eq!(main.blocks[0].end, Position::new(12, 2));
        assert_eq!(main.blocks[0].num_stmt, 2);
        assert_eq!(main.blocks[0].count, 5);
        assert_eq!(main.blocks[1].count, 0);

        let util = &profile.files[1];
        assert_eq!(util.file_id, "github.com/user/project/util.go");
        assert_eq!(util.blocks[0].num_stmt, 3);
    }

    #[test]
    fn test_parse_gocover_sorts_blocks() {
        let input = b"mode: set\n\
            example.com/pkg/f.go:20.1,22.2 1 1\n\
            example.com/pkg/f.go:5.1,6.2 1 0\n\
            example.com/pkg/f.go:5.1,5.9 1 1\n";
        let profile = parse(input).unwrap();
        let starts: Vec<_> = profile.files[0]
            .blocks
            .iter()
            .map(|b| (b.start.line, b.end.line, b.end.col))
            .collect();
        assert_eq!(starts, vec![(5, 5, 9), (5, 6, 2), (20, 22, 2)]);
    }

    #[test]
    fn test_parse_gocover_merges_duplicate_blocks() {
        let input = b"mode: count\n\
            example.com/pkg/f.go:1.1,3.2 2 1\n\
            example.com/pkg/f.go:1.1,3.2 2 4\n";
        let profile = parse(input).unwrap();
        assert_eq!(profile.files[0].blocks.len(), 1);
        assert_eq!(profile.files[0].blocks[0].count, 5);

        let input = b"mode: set\n\
            example.com/pkg/f.go:1.1,3.2 2 0\n\
            example.com/pkg/f.go:1.1,3.2 2 1\n";
        let profile = parse(input).unwrap();
        assert_eq!(profile.files[0].blocks[0].count, 1);
    }

    #[test]
    fn test_parse_gocover_empty() {
        let profile = parse(b"").unwrap();
        assert!(profile.files.is_empty());

        let profile = parse(b"mode: atomic\n").unwrap();
        assert_eq!(profile.mode, "atomic");
        assert!(profile.files.is_empty());
    }

    #[test]
    fn test_parse_gocover_missing_mode_is_error() {
        let err = parse(b"example.com/pkg/f.go:1.1,5.10 2 3\n").unwrap_err();
        assert!(matches!(err, CovriskError::ProfileParse { line: 1, .. }));
    }

    #[test]
    fn test_parse_gocover_malformed_block_is_error() {
        let input = b"mode: set\n\
            example.com/pkg/f.go:1.1,5.10 2 3\n\
            example.com/pkg/f.go:garbage\n";
        let err = parse(input).unwrap_err();
        match err {
            CovriskError::ProfileParse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("garbage"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_block_line() {
        let (file, block) =
            parse_block_line("github.com/user/repo/file.go:10.1,20.5 3 1").unwrap();
        assert_eq!(file, "github.com/user/repo/file.go");
        assert_eq!(block.start, Position::new(10, 1));
        assert_eq!(block.end, Position::new(20, 5));
        assert_eq!(block.num_stmt, 3);
        assert_eq!(block.count, 1);

        assert!(parse_block_line("file.go:10.1,20.5 3").is_none());
        assert!(parse_block_line("file.go:10,20.5 3 1").is_none());
        assert!(parse_block_line(":10.1,20.5 3 1").is_none());
        assert!(parse_block_line("file.go:10.1,20.5 3 1 9").is_none());
    }

    #[test]
    fn test_trailing_whitespace_tolerated() {
        let input = b"mode: set\nexample.com/m/a.go:1.1,2.2 1 1 \nexample.com/m/a.go:3.1,4.2 2 0\t\n";
        let profile = parse(input).unwrap();
        let blocks = &profile.files[0].blocks;
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].count, 1);
        assert_eq!(blocks[1].num_stmt, 2);
    }
}
