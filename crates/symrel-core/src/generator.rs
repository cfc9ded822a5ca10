//! Lexicon generation: exhaustive token enumeration.

use symrel_model::LexiconConfig;

/// Generating more tokens than this requires explicit confirmation.
pub const GENERATION_WARNING_THRESHOLD: u64 = 10_000;

/// Exact number of tokens a lexicon defines: Σ_{i=1..L} n^i for n
/// symbols and maximum length L. `None` when the count overflows u64.
pub fn total_token_count(symbol_count: usize, max_length: usize) -> Option<u64> {
    let n = symbol_count as u64;
    let mut total: u64 = 0;
    let mut term: u64 = 1;
    for _ in 0..max_length {
        term = term.checked_mul(n)?;
        total = total.checked_add(term)?;
    }
    Some(total)
}

/// Enumerate every token the lexicon defines, in the canonical order:
/// lengths ascending, and within a length lexicographic by alphabet
/// symbol order. Each pass extends the previous length's tokens by one
/// symbol, so all tokens of a given length are contiguous.
pub fn enumerate_tokens(lexicon: &LexiconConfig) -> Vec<String> {
    let symbols: Vec<char> = lexicon.symbols().collect();
    let mut tokens = Vec::new();
    let mut frontier = vec![String::new()];
    for _ in 0..lexicon.max_length() {
        let mut next = Vec::with_capacity(frontier.len() * symbols.len());
        for prefix in &frontier {
            for &symbol in &symbols {
                let mut token = String::with_capacity(prefix.len() + symbol.len_utf8());
                token.push_str(prefix);
                token.push(symbol);
                next.push(token);
            }
        }
        tokens.extend_from_slice(&next);
        frontier = next;
    }
    tokens
}
