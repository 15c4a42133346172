//! Attribution of profile blocks to the functions that contain them.

use crate::model::{percentage, CoverageBlock, FuncCoverage, FunctionExtent};

/// Attribute coverage blocks to each extent of a single file.
///
/// `blocks` must be sorted by start position (the profile parser
/// guarantees this). A block overlaps a function unless it ends at or
/// before the function's start, or starts at or after its end. Column
/// ties are resolved on the block's end column at the start boundary and
/// on its start column at the end boundary.
pub fn attribute(extents: &[FunctionExtent], blocks: &[CoverageBlock]) -> Vec<FuncCoverage> {
    extents
        .iter()
        .map(|extent| attribute_one(extent, blocks))
        .collect()
}

fn attribute_one(extent: &FunctionExtent, blocks: &[CoverageBlock]) -> FuncCoverage {
    let (start, end) = (extent.start, extent.end);
    let mut covered = 0;
    let mut total = 0;

    for block in blocks {
        if block.start.line > end.line || (block.start.line == end.line && block.start.col >= end.col)
        {
            // Past the end of the function; later blocks start later still.
            break;
        }
        if block.end.line < start.line || (block.end.line == start.line && block.end.col <= start.col)
        {
            continue;
        }
        total += block.num_stmt;
        if block.count > 0 {
            covered += block.num_stmt;
        }
    }

    FuncCoverage {
        file: extent.file.clone(),
        function: extent.name.clone(),
        start_line: start.line,
        end_line: end.line,
        covered,
        total,
        percentage: percentage(covered, total),
    }
}
