use std::{iter, ops::RangeBounds};

use super::{
    check_index, get_lr, left_child, mid, normalize,
    operation::{Bulk, Operator, RangeApply, Repeat},
    right_child, IndexError, Segtree,
};

/// 区間作用と区間クエリを行う遅延セグメント木。
///
/// 頂点の集約値は常に正しい値を持つ。`lazy[idx]`が`Some(d)`のとき、
/// `d`はまだ子の集約値に作用していない。子を読む前に必ず`push_down`する。
#[derive(Debug, Clone)]
pub struct LazySegtree<T, OP, A = Repeat> {
    len: usize,
    tree: Box<[T]>,
    lazy: Box<[Option<T>]>,
    op: OP,
    apply: A,
}

impl<T, OP, A> LazySegtree<T, OP, A> {
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T: Clone, OP: Operator<Query = T>> LazySegtree<T, OP, Repeat> {
    pub fn new(data: Vec<T>, op: OP) -> Self {
        Self::from_segtree(Segtree::new(data, op))
    }

    pub fn from_iter_op<I>(iter: I, op: OP) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_segtree(Segtree::from_iter_op(iter, op))
    }

    pub fn from_segtree(segtree: Segtree<T, OP>) -> Self {
        let (data, tree, op) = segtree.into_parts();
        let lazy = iter::repeat_with(|| None).take(tree.len()).collect();
        Self {
            len: data.len(),
            tree,
            lazy,
            op,
            apply: Repeat,
        }
    }

    /// 区間全体への作用を`f(left, right, delta)`で一度に計算するようにする。
    ///
    /// `f`の結果は`delta`を`right - left + 1`回`op`した結果と一致する必要がある。
    pub fn with_bulk_apply<F>(self, f: F) -> LazySegtree<T, OP, Bulk<F>>
    where
        F: Fn(usize, usize, &T) -> T,
    {
        tracing::trace!(len = self.len, "switching to bulk range apply");
        LazySegtree {
            len: self.len,
            tree: self.tree,
            lazy: self.lazy,
            op: self.op,
            apply: Bulk(f),
        }
    }
}

impl<T, OP, A> LazySegtree<T, OP, A>
where
    T: Clone,
    OP: Operator<Query = T>,
    A: RangeApply<OP>,
{
    /// 遅延値`delta`を`idx`の遅延値に合成する。
    fn composite(&mut self, idx: usize, delta: &T) {
        match &mut self.lazy[idx] {
            Some(lazy) => self.op.op_assign_left(lazy, delta),
            slot @ None => *slot = Some(delta.clone()),
        }
    }

    /// 頂点`idx`(担当区間`[l, r]`)の部分木全体に`delta`を作用させる。
    fn apply_all_tree(&mut self, idx: usize, l: usize, r: usize, delta: &T) {
        self.apply.apply(&self.op, &mut self.tree[idx], l, r, delta);
        if l != r {
            self.composite(idx, delta);
        }
    }

    fn push_down(&mut self, idx: usize, l: usize, r: usize) {
        let Some(delta) = self.lazy[idx].take() else {
            return;
        };
        debug_assert_ne!(l, r, "leaf with pending delta");
        let m = mid(l, r);
        self.apply_all_tree(left_child(idx), l, m, &delta);
        self.apply_all_tree(right_child(idx), m + 1, r, &delta);
    }

    fn eval(&mut self, idx: usize) {
        self.tree[idx] = self
            .op
            .op(&self.tree[left_child(idx)], &self.tree[right_child(idx)]);
    }

    pub fn get(&mut self, index: usize) -> Result<T, IndexError> {
        check_index(index, self.len)?;
        let (mut idx, mut l, mut r) = (0, 0, self.len - 1);
        while l != r {
            self.push_down(idx, l, r);
            let m = mid(l, r);
            if index <= m {
                idx = left_child(idx);
                r = m;
            } else {
                idx = right_child(idx);
                l = m + 1;
            }
        }
        Ok(self.tree[idx].clone())
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<(), IndexError> {
        check_index(index, self.len)?;
        self.set_inner(0, 0, self.len - 1, index, value);
        Ok(())
    }

    fn set_inner(&mut self, idx: usize, l: usize, r: usize, index: usize, value: T) {
        if l == r {
            self.tree[idx] = value;
            return;
        }
        self.push_down(idx, l, r);
        let m = mid(l, r);
        if index <= m {
            self.set_inner(left_child(idx), l, m, index, value);
        } else {
            self.set_inner(right_child(idx), m + 1, r, index, value);
        }
        self.eval(idx);
    }

    /// 閉区間`[left, right]`の集約値。`left > right`なら両端を入れ替える。
    pub fn query(&mut self, left: usize, right: usize) -> Result<T, IndexError> {
        let (left, right) = normalize(left, right, self.len)?;
        Ok(self.query_inner(0, 0, self.len - 1, left, right))
    }

    /// 半開区間で指定する`query`。空区間なら単位元を返す。
    pub fn fold<R: RangeBounds<usize>>(&mut self, range: R) -> Result<T, IndexError> {
        let (l, r) = get_lr(self.len, range)?;
        if l == r {
            Ok(self.op.ident())
        } else {
            Ok(self.query_inner(0, 0, self.len - 1, l, r - 1))
        }
    }

    fn query_inner(&mut self, idx: usize, l: usize, r: usize, ql: usize, qr: usize) -> T {
        if r < ql || qr < l {
            return self.op.ident();
        }
        if ql <= l && r <= qr {
            return self.tree[idx].clone();
        }
        self.push_down(idx, l, r);
        let m = mid(l, r);
        let left = self.query_inner(left_child(idx), l, m, ql, qr);
        let right = self.query_inner(right_child(idx), m + 1, r, ql, qr);
        self.op.op(&left, &right)
    }

    /// 閉区間`[left, right]`の各要素`x`を`op(x, delta)`で置き換える。
    /// `left > right`なら両端を入れ替える。
    pub fn add(&mut self, left: usize, right: usize, delta: T) -> Result<(), IndexError> {
        let (left, right) = normalize(left, right, self.len)?;
        self.add_inner(0, 0, self.len - 1, left, right, &delta);
        Ok(())
    }

    /// 半開区間で指定する`add`。空区間なら何もしない。
    pub fn apply<R: RangeBounds<usize>>(&mut self, range: R, delta: T) -> Result<(), IndexError> {
        let (l, r) = get_lr(self.len, range)?;
        if l < r {
            self.add_inner(0, 0, self.len - 1, l, r - 1, &delta);
        }
        Ok(())
    }

    fn add_inner(&mut self, idx: usize, l: usize, r: usize, al: usize, ar: usize, delta: &T) {
        if r < al || ar < l {
            return;
        }
        if al <= l && r <= ar {
            self.apply_all_tree(idx, l, r, delta);
            return;
        }
        self.push_down(idx, l, r);
        let m = mid(l, r);
        self.add_inner(left_child(idx), l, m, al, ar, delta);
        self.add_inner(right_child(idx), m + 1, r, al, ar, delta);
        self.eval(idx);
    }

    fn flush(&mut self, idx: usize, l: usize, r: usize, out: &mut Vec<T>) {
        if l == r {
            out.push(self.tree[idx].clone());
            return;
        }
        self.push_down(idx, l, r);
        let m = mid(l, r);
        self.flush(left_child(idx), l, m, out);
        self.flush(right_child(idx), m + 1, r, out);
    }

    /// 作用素をすべて作用させた後の配列を返す。データ数をnとすると、O(n)時間かかることに注意。
    pub fn to_vec(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        if self.len > 0 {
            self.flush(0, 0, self.len - 1, &mut out);
        }
        tracing::trace!(
            len = self.len,
            apply = self.apply.name(),
            "flushed pending deltas"
        );
        out
    }

    pub fn into_vec(mut self) -> Vec<T> {
        self.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::super::operation;
    use super::*;

    fn sum_bulk(l: usize, r: usize, d: &i64) -> i64 {
        d * (r - l + 1) as i64
    }

    #[test]
    fn build_test() {
        let segtree = LazySegtree::from_iter_op(0..14, operation::min());
        assert_eq!(segtree.len(), 14);
        assert_eq!(segtree.tree.len(), 56);
        assert_eq!(segtree.tree[0], 0);
        assert_eq!(segtree.tree[2], 7);
        assert!(segtree.lazy.iter().all(Option::is_none));
    }

    #[test]
    fn sum_scenario() {
        let mut segtree = LazySegtree::new(vec![1i64, 2, 3, 4, 5], operation::add());
        assert_eq!(segtree.query(1, 3), Ok(9));
        segtree.add(1, 3, 10).unwrap();
        assert_eq!(segtree.query(0, 4), Ok(45));
        assert_eq!(segtree.query(1, 1), Ok(12));
        assert_eq!(segtree.to_vec(), vec![1, 12, 13, 14, 5]);
    }

    #[test]
    fn sum_scenario_bulk() {
        let mut segtree =
            LazySegtree::new(vec![1i64, 2, 3, 4, 5], operation::add()).with_bulk_apply(sum_bulk);
        assert_eq!(segtree.query(1, 3), Ok(9));
        segtree.add(3, 1, 10).unwrap();
        assert_eq!(segtree.query(0, 4), Ok(45));
        assert_eq!(segtree.query(1, 1), Ok(12));
        assert_eq!(segtree.get(2), Ok(13));
    }

    #[test]
    fn push_down_is_idempotent() {
        let mut segtree = LazySegtree::new(vec![0i64; 8], operation::add());
        segtree.add(0, 7, 3).unwrap();
        assert_eq!(segtree.tree[0], 24);
        assert_eq!(segtree.lazy[0], Some(3));

        segtree.push_down(0, 0, 7);
        assert_eq!(segtree.lazy[0], None);
        let tree = segtree.tree.clone();
        let lazy = segtree.lazy.clone();
        assert_eq!(tree[1], 12);
        assert_eq!(lazy[1], Some(3));

        segtree.push_down(0, 0, 7);
        assert_eq!(segtree.tree, tree);
        assert_eq!(segtree.lazy, lazy);
    }

    #[test]
    fn deltas_are_composed() {
        let mut segtree = LazySegtree::new(vec![0i64; 4], operation::add());
        segtree.add(0, 3, 1).unwrap();
        segtree.add(0, 3, 2).unwrap();
        assert_eq!(segtree.lazy[0], Some(3));
        segtree.add(0, 1, 4).unwrap();
        assert_eq!(segtree.lazy[0], None);
        assert_eq!(segtree.to_vec(), vec![7, 7, 3, 3]);
        assert!(segtree.lazy.iter().all(Option::is_none));
    }

    #[test]
    fn set_after_add() {
        let mut segtree = LazySegtree::new(vec![1i64, 2, 3, 4, 5, 6], operation::add());
        segtree.add(0, 5, 100).unwrap();
        segtree.set(2, 0).unwrap();
        assert_eq!(segtree.get(2), Ok(0));
        assert_eq!(segtree.query(2, 2), Ok(0));
        assert_eq!(segtree.get(3), Ok(104));
        assert_eq!(segtree.query(0, 5), Ok(101 + 102 + 104 + 105 + 106));
    }

    #[test]
    fn max_with_chmax() {
        // opがmaxのとき、区間作用はx -> max(x, delta)になる
        let mut segtree = LazySegtree::new(vec![5, 1, 8, 2, 7], operation::max::<i32>());
        segtree.add(1, 3, 6).unwrap();
        assert_eq!(segtree.to_vec(), vec![5, 6, 8, 6, 7]);
        assert_eq!(segtree.query(3, 4), Ok(7));
        assert_eq!(segtree.query(0, 1), Ok(6));
    }

    #[test]
    fn range_bounds_forms() {
        let mut segtree =
            LazySegtree::new(vec![0i64; 10], operation::add()).with_bulk_apply(sum_bulk);
        segtree.apply(2..5, 1).unwrap();
        segtree.apply(4.., 2).unwrap();
        segtree.apply(3..3, 100).unwrap();
        assert_eq!(segtree.fold(..), Ok(3 + 2 * 6));
        assert_eq!(segtree.fold(4..=4), Ok(3));
        assert_eq!(segtree.fold(9..9), Ok(0));
        assert_eq!(segtree.into_vec(), vec![0, 0, 1, 1, 3, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn out_of_bounds_leaves_tree_unchanged() {
        let mut segtree = LazySegtree::new(vec![1i64, 2, 3], operation::add());
        let len = segtree.len();
        assert_eq!(segtree.add(0, 3, 5), Err(IndexError { index: 3, len }));
        assert_eq!(segtree.apply(1..4, 5), Err(IndexError { index: 4, len }));
        assert_eq!(segtree.query(3, 0), Err(IndexError { index: 3, len }));
        assert_eq!(segtree.get(3), Err(IndexError { index: 3, len }));
        assert_eq!(segtree.set(3, 0), Err(IndexError { index: 3, len }));
        assert!(segtree.lazy.iter().all(Option::is_none));
        assert_eq!(segtree.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn empty_test() {
        let mut segtree = LazySegtree::new(Vec::<i64>::new(), operation::add());
        assert!(segtree.is_empty());
        assert!(segtree.add(0, 0, 1).is_err());
        assert!(segtree.query(0, 0).is_err());
        assert!(segtree.get(0).is_err());
        assert_eq!(segtree.fold(..), Ok(0));
        assert_eq!(segtree.to_vec(), Vec::<i64>::new());
    }

    #[test]
    fn from_segtree_keeps_contents() {
        let mut segtree = Segtree::new(vec![4i64, 1, 7, 3], operation::add());
        segtree.set(1, 10).unwrap();
        let mut lazy = LazySegtree::from_segtree(segtree);
        assert_eq!(lazy.query(0, 3), Ok(24));
        lazy.add(0, 1, -1).unwrap();
        assert_eq!(lazy.into_vec(), vec![3, 9, 7, 3]);
    }

    #[test]
    fn update_range_all() {
        let n = 16;
        let mut segtree = LazySegtree::new(vec![0i64; n], operation::add());
        let mut expected = vec![0i64; n];
        for d in 1..=n {
            for l in 0..=n - d {
                segtree.add(l, l + d - 1, 1).unwrap();
                expected[l..l + d].iter_mut().for_each(|x| *x += 1);
            }
        }
        assert_eq!(segtree.to_vec(), expected);
    }
}
