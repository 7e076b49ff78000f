use std::{marker::PhantomData, ops};

/// 結合的な二項演算。`op(op(a, b), c) == op(a, op(b, c))`である必要がある。
///
/// 交換法則は要求しない。木は常に左の結果、右の結果の順に`op`を呼ぶ。
pub trait Operator {
    type Query;
    fn ident(&self) -> Self::Query;
    fn op(&self, a: &Self::Query, b: &Self::Query) -> Self::Query;

    fn op_assign_left(&self, a: &mut Self::Query, b: &Self::Query) {
        *a = self.op(a, b);
    }
}

trait HasZero {
    const ZERO: Self;
}

trait HasOne {
    const ONE: Self;
}

trait HasMax {
    const MAX: Self;
}

trait HasMin {
    const MIN: Self;
}

macro_rules! impl_trait_integer {
    ($($t:ty),*) => {
        $(
            impl HasZero for $t {
                const ZERO: Self = 0;
            }
            impl HasOne for $t {
                const ONE: Self = 1;
            }
            impl HasMax for $t {
                const MAX: Self = <$t>::MAX;
            }
            impl HasMin for $t {
                const MIN: Self = <$t>::MIN;
            }
        )*
    };
}

impl_trait_integer!(i8, i16, i32, i64, i128, isize);
impl_trait_integer!(u8, u16, u32, u64, u128, usize);

macro_rules! marker_operator {
    ($($name:ident),*) => {
        $(
            #[derive(Debug)]
            pub struct $name<T>(PhantomData<fn() -> T>);

            impl<T> Default for $name<T> {
                fn default() -> Self {
                    Self(PhantomData)
                }
            }

            impl<T> Clone for $name<T> {
                fn clone(&self) -> Self {
                    *self
                }
            }

            impl<T> Copy for $name<T> {}
        )*
    };
}

marker_operator!(Add, Mul, Max, Min);

impl<T> Operator for Add<T>
where
    T: ops::Add<Output = T> + Clone + HasZero,
{
    type Query = T;
    fn ident(&self) -> Self::Query {
        T::ZERO
    }
    fn op(&self, a: &Self::Query, b: &Self::Query) -> Self::Query {
        a.clone() + b.clone()
    }
}

impl<T> Operator for Mul<T>
where
    T: ops::Mul<Output = T> + Clone + HasOne,
{
    type Query = T;
    fn ident(&self) -> Self::Query {
        T::ONE
    }
    fn op(&self, a: &Self::Query, b: &Self::Query) -> Self::Query {
        a.clone() * b.clone()
    }
}

impl<T> Operator for Max<T>
where
    T: Ord + Clone + HasMin,
{
    type Query = T;
    fn ident(&self) -> Self::Query {
        T::MIN
    }
    fn op(&self, a: &Self::Query, b: &Self::Query) -> Self::Query {
        if a >= b {
            a.clone()
        } else {
            b.clone()
        }
    }
}

impl<T> Operator for Min<T>
where
    T: Ord + Clone + HasMax,
{
    type Query = T;
    fn ident(&self) -> Self::Query {
        T::MAX
    }
    fn op(&self, a: &Self::Query, b: &Self::Query) -> Self::Query {
        if a <= b {
            a.clone()
        } else {
            b.clone()
        }
    }
}

/// 文字列の連結。非可換。
#[derive(Debug, Default, Clone, Copy)]
pub struct Concat;

impl Operator for Concat {
    type Query = String;
    fn ident(&self) -> Self::Query {
        String::new()
    }
    fn op(&self, a: &Self::Query, b: &Self::Query) -> Self::Query {
        let mut s = String::with_capacity(a.len() + b.len());
        s.push_str(a);
        s.push_str(b);
        s
    }
}

/// クロージャと単位元から作る演算。
#[derive(Debug, Clone)]
pub struct FnOperator<T, F> {
    ident: T,
    f: F,
}

impl<T, F> Operator for FnOperator<T, F>
where
    T: Clone,
    F: Fn(&T, &T) -> T,
{
    type Query = T;
    fn ident(&self) -> Self::Query {
        self.ident.clone()
    }
    fn op(&self, a: &Self::Query, b: &Self::Query) -> Self::Query {
        (self.f)(a, b)
    }
}

pub fn add<T>() -> Add<T> {
    Add::default()
}

pub fn mul<T>() -> Mul<T> {
    Mul::default()
}

pub fn max<T>() -> Max<T> {
    Max::default()
}

pub fn min<T>() -> Min<T> {
    Min::default()
}

pub fn concat() -> Concat {
    Concat
}

pub fn from_fn<T, F>(ident: T, f: F) -> FnOperator<T, F>
where
    T: Clone,
    F: Fn(&T, &T) -> T,
{
    FnOperator { ident, f }
}

/// 区間`[left, right]`の各要素に`delta`を`op`で作用させたときの、集約値への影響を計算する。
///
/// 正しく動くには、区間の各要素`x`を`op(x, delta)`に置き換えた後の集約値が
/// `apply`の結果と一致する必要がある(和なら`agg + delta * (right - left + 1)`)。
pub trait RangeApply<OP: Operator> {
    fn apply(&self, op: &OP, agg: &mut OP::Query, left: usize, right: usize, delta: &OP::Query);

    fn name(&self) -> &'static str;
}

/// `op(agg, delta)`を区間長の回数だけ繰り返す。O(right - left + 1)。
#[derive(Debug, Default, Clone, Copy)]
pub struct Repeat;

impl<OP: Operator> RangeApply<OP> for Repeat {
    fn apply(&self, op: &OP, agg: &mut OP::Query, left: usize, right: usize, delta: &OP::Query) {
        for _ in left..=right {
            op.op_assign_left(agg, delta);
        }
    }

    fn name(&self) -> &'static str {
        "repeat"
    }
}

/// `f(left, right, delta)`で区間全体への作用を閉じた形で計算する。O(1)。
#[derive(Debug, Clone, Copy)]
pub struct Bulk<F>(pub F);

impl<OP, F> RangeApply<OP> for Bulk<F>
where
    OP: Operator,
    F: Fn(usize, usize, &OP::Query) -> OP::Query,
{
    fn apply(&self, op: &OP, agg: &mut OP::Query, left: usize, right: usize, delta: &OP::Query) {
        let bulk = (self.0)(left, right, delta);
        op.op_assign_left(agg, &bulk);
    }

    fn name(&self) -> &'static str {
        "bulk"
    }
}
