pub mod lazy;
pub mod operation;

pub use lazy::LazySegtree;
use operation::Operator;
use std::{
    iter,
    ops::{Bound, Deref, DerefMut, RangeBounds},
};

/// 範囲外の添字が渡されたときのエラー。
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("index {index} out of range for segment tree of length {len}")]
pub struct IndexError {
    pub index: usize,
    pub len: usize,
}

fn check_index(index: usize, len: usize) -> Result<(), IndexError> {
    if index < len {
        Ok(())
    } else {
        tracing::debug!(index, len, "index rejected");
        Err(IndexError { index, len })
    }
}

/// 閉区間`[left, right]`を検査する。`left > right`なら入れ替える。
fn normalize(left: usize, right: usize, len: usize) -> Result<(usize, usize), IndexError> {
    let (left, right) = if left > right {
        tracing::debug!(left, right, "swapping reversed bounds");
        (right, left)
    } else {
        (left, right)
    };
    check_index(left, len)?;
    check_index(right, len)?;
    Ok((left, right))
}

/// 戻り値を`(l, r)`とすると以下が保証される。
///
/// * `l <= r <= len`
fn get_lr<R: RangeBounds<usize>>(len: usize, range: R) -> Result<(usize, usize), IndexError> {
    use Bound::*;
    let l = match range.start_bound() {
        Excluded(&s) => s.checked_add(1).ok_or(IndexError { index: s, len })?,
        Included(&s) => s,
        Unbounded => 0,
    };
    let r = match range.end_bound() {
        Excluded(&e) => e,
        Included(&e) => e.checked_add(1).ok_or(IndexError { index: e, len })?,
        Unbounded => len,
    };
    if r > len {
        tracing::debug!(end = r, len, "range end rejected");
        Err(IndexError { index: r, len })
    } else if l > r {
        tracing::debug!(start = l, end = r, len, "range start after end");
        Err(IndexError { index: l, len })
    } else {
        Ok((l, r))
    }
}

const fn left_child(idx: usize) -> usize {
    idx * 2 + 1
}

const fn right_child(idx: usize) -> usize {
    idx * 2 + 2
}

const fn mid(l: usize, r: usize) -> usize {
    l + (r - l) / 2
}

/// 区間クエリを行う非遅延セグメント木。
///
/// 頂点`idx`が区間`[l, r]`を担当するとき、左の子`2 * idx + 1`が`[l, mid]`を、
/// 右の子`2 * idx + 2`が`[mid + 1, r]`を担当する。
#[derive(Debug, Clone)]
pub struct Segtree<T, OP> {
    data: Box<[T]>,
    tree: Box<[T]>,
    op: OP,
}

impl<T, OP> Segtree<T, OP> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&T, IndexError> {
        check_index(index, self.len())?;
        Ok(&self.data[index])
    }

    pub(crate) fn into_parts(self) -> (Box<[T]>, Box<[T]>, OP) {
        (self.data, self.tree, self.op)
    }
}

impl<T, OP> Deref for Segtree<T, OP> {
    type Target = [T];
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T: Clone, OP: Operator<Query = T>> Segtree<T, OP> {
    pub fn new(data: Vec<T>, op: OP) -> Self {
        let len = data.len();
        let tree = iter::repeat_with(|| op.ident()).take(len * 4).collect();
        let mut segtree = Self {
            data: data.into_boxed_slice(),
            tree,
            op,
        };
        if len > 0 {
            segtree.build(0, 0, len - 1);
        }
        tracing::trace!(len, "built segment tree");
        segtree
    }

    pub fn from_iter_op<I: IntoIterator<Item = T>>(iter: I, op: OP) -> Self {
        Self::new(iter.into_iter().collect(), op)
    }

    fn build(&mut self, idx: usize, l: usize, r: usize) {
        if l == r {
            self.tree[idx] = self.data[l].clone();
            return;
        }
        let m = mid(l, r);
        self.build(left_child(idx), l, m);
        self.build(right_child(idx), m + 1, r);
        self.eval(idx);
    }

    fn eval(&mut self, idx: usize) {
        self.tree[idx] = self
            .op
            .op(&self.tree[left_child(idx)], &self.tree[right_child(idx)]);
    }

    /// `data[index]`から根までの集約値を再計算する。
    fn update_val(&mut self, idx: usize, l: usize, r: usize, index: usize) {
        if l == r {
            self.tree[idx] = self.data[index].clone();
            return;
        }
        let m = mid(l, r);
        if index <= m {
            self.update_val(left_child(idx), l, m, index);
        } else {
            self.update_val(right_child(idx), m + 1, r, index);
        }
        self.eval(idx);
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<(), IndexError> {
        check_index(index, self.len())?;
        self.data[index] = value;
        self.update_val(0, 0, self.len() - 1, index);
        Ok(())
    }

    pub fn get_mut(&mut self, index: usize) -> Result<ValMut<'_, T, OP>, IndexError> {
        check_index(index, self.len())?;
        Ok(ValMut {
            segtree: self,
            index,
        })
    }

    /// 閉区間`[left, right]`の集約値。`left > right`なら両端を入れ替える。
    pub fn query(&self, left: usize, right: usize) -> Result<T, IndexError> {
        let (left, right) = normalize(left, right, self.len())?;
        Ok(self.query_inner(0, 0, self.len() - 1, left, right))
    }

    /// 半開区間で指定する`query`。空区間なら単位元を返す。
    pub fn fold<R: RangeBounds<usize>>(&self, range: R) -> Result<T, IndexError> {
        let (l, r) = get_lr(self.len(), range)?;
        if l == r {
            Ok(self.op.ident())
        } else {
            Ok(self.query_inner(0, 0, self.len() - 1, l, r - 1))
        }
    }

    fn query_inner(&self, idx: usize, l: usize, r: usize, ql: usize, qr: usize) -> T {
        if l == ql && r == qr {
            return self.tree[idx].clone();
        }
        let m = mid(l, r);
        if ql > m {
            self.query_inner(right_child(idx), m + 1, r, ql, qr)
        } else if qr <= m {
            self.query_inner(left_child(idx), l, m, ql, qr)
        } else {
            let left = self.query_inner(left_child(idx), l, m, ql, m);
            let right = self.query_inner(right_child(idx), m + 1, r, m + 1, qr);
            self.op.op(&left, &right)
        }
    }
}

/// 要素への可変参照。ドロップ時に根までの集約値を再計算する。
pub struct ValMut<'a, T: Clone, OP: Operator<Query = T>> {
    segtree: &'a mut Segtree<T, OP>,
    index: usize,
}

impl<'a, T: Clone, OP: Operator<Query = T>> Deref for ValMut<'a, T, OP> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.segtree.data[self.index]
    }
}

impl<'a, T: Clone, OP: Operator<Query = T>> DerefMut for ValMut<'a, T, OP> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.segtree.data[self.index]
    }
}

impl<'a, T: Clone, OP: Operator<Query = T>> Drop for ValMut<'a, T, OP> {
    fn drop(&mut self) {
        let len = self.segtree.len();
        self.segtree.update_val(0, 0, len - 1, self.index);
    }
}

impl<T, OP> FromIterator<T> for Segtree<T, OP>
where
    T: Clone,
    OP: Default + Operator<Query = T>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_op(iter, OP::default())
    }
}
