//! Partial application with a fixed receiver.
//!
//! [`bind`] captures a callable, the receiver it should run against and a
//! list of leading arguments. Calling the result appends the trailing
//! arguments to the leading ones before invoking the original callable.

use std::fmt;

/// A callable bound to a receiver and a prefix of its arguments.
#[derive(Clone)]
pub struct Bound<F, R, A> {
    func: F,
    receiver: R,
    leading: Vec<A>,
}

/// Binds `func` to `receiver` with `leading` arguments.
pub fn bind<F, R, A, O>(
    func: F,
    receiver: R,
    leading: impl IntoIterator<Item = A>,
) -> Bound<F, R, A>
where
    F: Fn(&R, Vec<A>) -> O,
{
    Bound {
        func,
        receiver,
        leading: leading.into_iter().collect(),
    }
}

impl<F, R, A> Bound<F, R, A>
where
    A: Clone,
{
    /// Invokes the bound callable with `leading ++ trailing`.
    pub fn call<O>(&self, trailing: impl IntoIterator<Item = A>) -> O
    where
        F: Fn(&R, Vec<A>) -> O,
    {
        let mut args = self.leading.clone();
        args.extend(trailing);
        (self.func)(&self.receiver, args)
    }

    /// Returns a new callable with `more` appended to the leading arguments.
    ///
    /// The receiver stays the one given to the original [`bind`].
    pub fn bind(&self, more: impl IntoIterator<Item = A>) -> Self
    where
        F: Clone,
        R: Clone,
    {
        let mut leading = self.leading.clone();
        leading.extend(more);
        Self {
            func: self.func.clone(),
            receiver: self.receiver.clone(),
            leading,
        }
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    pub fn leading(&self) -> &[A] {
        &self.leading
    }
}

impl<F, R: fmt::Debug, A: fmt::Debug> fmt::Debug for Bound<F, R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound")
            .field("receiver", &self.receiver)
            .field("leading", &self.leading)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeter {
        name: &'static str,
    }

    fn greet(greeter: &Greeter, words: Vec<&'static str>) -> String {
        format!("{}: {}", greeter.name, words.join(" "))
    }

    #[test]
    fn test_bind_concatenates_arguments() {
        let bound = bind(greet, Greeter { name: "ann" }, ["hello"]);
        assert_eq!(bound.call(["there", "bob"]), "ann: hello there bob");
        assert_eq!(bound.call([]), "ann: hello");
    }

    #[test]
    fn test_bind_with_closure_receiver() {
        let scale = |factor: &i64, args: Vec<i64>| args.iter().map(|x| x * factor).sum::<i64>();
        let bound = bind(scale, 10, [1, 2]);
        assert_eq!(bound.call([3]), 60);
        assert_eq!(bound.leading(), &[1, 2]);
        assert_eq!(*bound.receiver(), 10);
    }

    #[test]
    fn test_rebind_keeps_receiver() {
        let join = |sep: &&str, args: Vec<String>| args.join(*sep);
        let first = bind(join, "-", vec!["a".to_string()]);
        let second = first.bind(vec!["b".to_string()]);

        assert_eq!(second.call(vec!["c".to_string()]), "a-b-c");
        assert_eq!(first.call(vec!["c".to_string()]), "a-c");
        assert_eq!(*second.receiver(), "-");
    }
}
