//! AcWing 1275 最大数
//!
//! `A t`で`(t + last) mod p`を末尾に追加し、`Q L`で末尾`L`個の最大値を答える。
//! `last`は直前の`Q`の答え(初期値0)。

use std::io::{self, BufRead, BufWriter, Write};

use anyhow::Context;
use proconio::{input, source::once::OnceSource};
use segment_tree::{operation, Segtree};

fn solve<R: BufRead, W: Write>(source: &mut OnceSource<R>, out: &mut W) -> anyhow::Result<()> {
    input! {
        from &mut *source,
        m: usize,
        p: i64,
    }
    let mut segtree = Segtree::new(vec![0i64; m], operation::max());
    let mut cnt = 0usize;
    let mut last = 0i64;
    for _ in 0..m {
        input! {
            from &mut *source,
            kind: char,
            x: i64,
        }
        match kind {
            'A' => {
                segtree
                    .set(cnt, (x + last).rem_euclid(p))
                    .context("more appends than operations")?;
                cnt += 1;
            }
            'Q' => {
                let l = usize::try_from(x).context("negative query length")?;
                last = segtree
                    .query(cnt.wrapping_sub(l), cnt.wrapping_sub(1))
                    .with_context(|| format!("Q {l} with only {cnt} numbers"))?;
                writeln!(out, "{last}")?;
            }
            _ => anyhow::bail!("unknown operation {kind:?}"),
        }
    }
    tracing::debug!(appended = cnt, "done");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    lib_checker::init_logging();
    let stdin = io::stdin();
    let mut source = OnceSource::new(stdin.lock());
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    solve(&mut source, &mut out)?;
    out.flush()?;
    Ok(())
}
