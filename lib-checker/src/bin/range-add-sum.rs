//! AcWing 243 一个简单的整数问题2
//!
//! `C l r d`で`[l, r]`に`d`を加え、`Q l r`で`[l, r]`の和を答える。添字は1-indexed。

use std::io::{self, BufRead, BufWriter, Write};

use proconio::{input, marker::Usize1, source::once::OnceSource};
use segment_tree::{operation, LazySegtree};

fn solve<R: BufRead, W: Write>(source: &mut OnceSource<R>, out: &mut W) -> anyhow::Result<()> {
    input! {
        from &mut *source,
        n: usize,
        m: usize,
        a: [i64; n],
    }
    let mut segtree = LazySegtree::new(a, operation::add())
        .with_bulk_apply(|l, r, d: &i64| d * (r - l + 1) as i64);
    for _ in 0..m {
        input! {
            from &mut *source,
            kind: char,
            l: Usize1,
            r: Usize1,
        }
        match kind {
            'C' => {
                input! {
                    from &mut *source,
                    d: i64,
                }
                segtree.add(l, r, d)?;
            }
            'Q' => {
                writeln!(out, "{}", segtree.query(l, r)?)?;
            }
            _ => anyhow::bail!("unknown operation {kind:?}"),
        }
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> anyhow::Result<String> {
        let mut source = OnceSource::from(input);
        let mut out = vec![];
        solve(&mut source, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn sample() {
        let input = "10 5\n1 2 3 4 5 6 7 8 9 10\nQ 4 4\nQ 1 10\nQ 2 4\nC 3 6 3\nQ 2 4\n";
        assert_eq!(run(input).unwrap(), "4\n55\n9\n15\n");
    }

    #[test]
    fn out_of_range() {
        let err = run("3 1\n1 2 3\nQ 1 4\n").unwrap_err();
        assert!(err.downcast_ref::<segment_tree::IndexError>().is_some());
    }
}
