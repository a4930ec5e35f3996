// The indent-to-brace preprocessor: turns maximal runs of `| `-prefixed
// lines into an explicit `{ ... }` block, recursively (a nested block can
// itself use one more level of `| `-prefixing). A direct port of
// `original_source/pamplemousse.py`'s `preprocess`, which already recurses
// on the de-prefixed block (`preprocess(block)`) and so already supports
// arbitrary nesting depth; this is the same recursive structure, not a
// generalization beyond it.

/// Runs the transform over already-split source lines (the caller is
/// expected to have already peeled off the obligations line).
pub fn preprocess(lines: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for &line in lines {
        if let Some(rest) = line.strip_prefix("| ") {
            block.push(rest);
            continue;
        }
        flush_block(&mut out, &mut block);
        out.push(line.trim().to_string());
    }
    flush_block(&mut out, &mut block);
    out
}

fn flush_block(out: &mut Vec<String>, block: &mut Vec<&str>) {
    if block.is_empty() {
        return;
    }
    out.push("{".to_string());
    out.extend(preprocess(block));
    out.push("}".to_string());
    block.clear();
}
