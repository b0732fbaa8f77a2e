//! Best-effort filling of a template from unformatted input
//!
//! Used when a raw value such as `12345678901` does not already match its
//! template. Placeholders pull eligible characters off the raw stream in
//! order, literals are inserted, and slots the input cannot fill are padded.

use crate::normalize::{FillOptions, LeftoverPolicy};
use crate::parser::{CharClass, Placeholder, Quantifier, Segment, Template};

/// Outcome of [`fill_from_raw`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    /// Template output, padded with the sentinel where input ran out
    pub output: String,
    /// Every required slot was filled (and, under
    /// [`LeftoverPolicy::Reject`], no input was left over)
    pub complete: bool,
    /// Alphanumeric input that no slot consumed
    pub leftover: String,
}

/// Remaining raw input
struct RawStream {
    chars: Vec<char>,
    pos: usize,
}

impl RawStream {
    fn new(raw: &str) -> Self {
        Self {
            chars: raw.chars().collect(),
            pos: 0,
        }
    }

    fn rest(&self) -> &[char] {
        &self.chars[self.pos..]
    }

    /// Next character of `class`, discarding anything before it. Nothing
    /// is consumed when no such character remains.
    fn next_eligible(&mut self, class: CharClass) -> Option<char> {
        let skip = self.rest().iter().position(|c| class.contains(*c))?;
        let c = self.chars[self.pos + skip];
        self.pos += skip + 1;
        Some(c)
    }

    fn leftover(&self) -> String {
        self.rest()
            .iter()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect()
    }
}

/// Fill the template's slots from raw input
///
/// Each placeholder discards raw characters outside its class and takes the
/// next eligible ones; a one-or-more slot takes a contiguous run but leaves
/// enough input for the required slots after it. Optional slots are filled
/// only when the input can cover them as well as every later required slot.
pub fn fill_from_raw(template: &Template, raw: &str, options: &FillOptions) -> Fill {
    let placeholders: Vec<&Placeholder> = template.placeholders().collect();

    let mut stream = RawStream::new(raw);
    let mut output = String::new();
    let mut complete = true;
    let mut index = 0;

    for segment in template.segments() {
        let p = match &segment.node {
            Segment::Literal(text) => {
                output.push_str(text);
                continue;
            }
            Segment::Placeholder(p) => p,
        };
        index += 1;
        let tail = &placeholders[index..];

        if p.optional && !covers(stream.rest(), std::iter::once(p).chain(required(tail))) {
            continue;
        }

        let taken = match p.quantifier {
            Quantifier::Exactly(n) => take_exact(p, n, &mut stream, &mut output),
            Quantifier::OneOrMore => take_run(p, tail, &mut stream, &mut output),
        };

        let short = p.min_len().saturating_sub(taken);
        if short > 0 {
            output.extend(std::iter::repeat(options.sentinel).take(short));
            complete = false;
        }
    }

    let leftover = stream.leftover();
    if options.leftover == LeftoverPolicy::Reject && !leftover.is_empty() {
        complete = false;
    }

    Fill {
        output,
        complete,
        leftover,
    }
}

fn required<'a>(slots: &'a [&'a Placeholder]) -> impl Iterator<Item = &'a Placeholder> + 'a {
    slots.iter().copied().filter(|p| !p.optional)
}

/// Whether `rest` still holds, in order, the minimum input of every slot.
/// Each slot only counts characters of its own class.
fn covers<'a>(rest: &[char], slots: impl IntoIterator<Item = &'a Placeholder>) -> bool {
    let mut chars = rest.iter();
    slots
        .into_iter()
        .all(|p| (0..p.min_len()).all(|_| chars.any(|c| p.class.contains(*c))))
}

fn take_exact(p: &Placeholder, n: usize, stream: &mut RawStream, output: &mut String) -> usize {
    let mut taken = 0;
    while taken < n {
        match stream.next_eligible(p.class) {
            Some(c) => {
                output.push(transform(p, c));
                taken += 1;
            }
            None => break,
        }
    }
    taken
}

/// Take a contiguous run of the slot's class, stopping before the input
/// left for the required slots in `tail` would run short
fn take_run(
    p: &Placeholder,
    tail: &[&Placeholder],
    stream: &mut RawStream,
    output: &mut String,
) -> usize {
    let Some(first) = stream.next_eligible(p.class) else {
        return 0;
    };
    output.push(transform(p, first));
    let mut taken = 1;
    loop {
        let rest = stream.rest();
        match rest.first() {
            Some(&c) if p.class.contains(c) && covers(&rest[1..], required(tail)) => {
                stream.pos += 1;
                output.push(transform(p, c));
                taken += 1;
            }
            _ => break,
        }
    }
    taken
}

fn transform(p: &Placeholder, c: char) -> char {
    match p.case {
        Some(case) => case.apply_char(c),
        None => c,
    }
}
