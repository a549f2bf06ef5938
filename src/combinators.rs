//! The parsing runtime the grammar is built on: a cursor over the source text
//! with 1-based row/column tracking, failure records that carry the stack of
//! grammatical contexts open at the failure point, and the small set of
//! primitives (token matching, predicate chomping, ordered alternation,
//! delimited sequences) that productions compose.
//!
//! Generic over the context (`C`) and problem (`P`) vocabularies so the
//! grammar layer owns those enums.

/// A single parse failure: where it happened, what the parser was doing, and
/// which low-level expectation was not met.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadEnd<C, P> {
    /// 1-based line number into the original source.
    pub row: u32,
    /// 1-based column number into the original source.
    pub col: u32,
    /// Contexts still open at the failure point, outermost first.
    pub context_stack: Vec<C>,
    pub problem: P,
}

/// The error side of a parse step: the dead ends hit so far, plus whether the
/// failing production had already consumed input.
///
/// The `committed` flag is what drives alternation: [`one_of`] only moves on
/// to the next alternative after an *uncommitted* failure. A production that
/// consumed input before failing knows what it was parsing, so its dead ends
/// are more specific than anything a later alternative could add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure<C, P> {
    pub committed: bool,
    pub dead_ends: Vec<DeadEnd<C, P>>,
}

impl<C, P> Failure<C, P> {
    /// Marks the failure committed when `committed` holds. Productions call
    /// this at each sequencing point after the first consumed character.
    pub fn committed_if(mut self, committed: bool) -> Self {
        self.committed |= committed;
        self
    }
}

pub type PResult<T, C, P> = Result<T, Failure<C, P>>;

/// A saved cursor position, for rewinding after an uncommitted failure.
#[derive(Debug, Clone, Copy)]
pub struct Mark {
    offset: usize,
    row: u32,
    col: u32,
    depth: usize,
}

/// The in-flight parse state: a position into the source plus the stack of
/// contexts entered and not yet exited.
#[derive(Debug)]
pub struct Cursor<'a, C> {
    src: &'a str,
    offset: usize,
    row: u32,
    col: u32,
    context: Vec<C>,
}

impl<'a, C: Clone> Cursor<'a, C> {
    pub fn new(src: &'a str) -> Self {
        Cursor {
            src,
            offset: 0,
            row: 1,
            col: 1,
            context: Vec::new(),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    /// The not-yet-consumed tail of the source.
    pub fn rest(&self) -> &'a str {
        &self.src[self.offset..]
    }

    pub fn at_end(&self) -> bool {
        self.offset == self.src.len()
    }

    /// Number of contexts currently open. Grows with grammar nesting, so
    /// callers can bound recursion on it.
    pub fn context_depth(&self) -> usize {
        self.context.len()
    }

    pub fn mark(&self) -> Mark {
        Mark {
            offset: self.offset,
            row: self.row,
            col: self.col,
            depth: self.context.len(),
        }
    }

    pub fn rewind(&mut self, mark: Mark) {
        self.offset = mark.offset;
        self.row = mark.row;
        self.col = mark.col;
        self.context.truncate(mark.depth);
    }

    /// A dead end at the current position, capturing the open contexts.
    pub fn dead_end<P>(&self, problem: P) -> DeadEnd<C, P> {
        DeadEnd {
            row: self.row,
            col: self.col,
            context_stack: self.context.clone(),
            problem,
        }
    }

    /// An uncommitted failure with a single dead end at the current position.
    pub fn fail<T, P>(&self, problem: P) -> PResult<T, C, P> {
        Err(Failure {
            committed: false,
            dead_ends: vec![self.dead_end(problem)],
        })
    }

    fn advance(&mut self, c: char) {
        self.offset += c.len_utf8();
        if c == '\n' {
            self.row += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }

    /// Matches `lit` exactly at the cursor, failing with `problem` otherwise.
    /// All or nothing: on mismatch the cursor does not move.
    pub fn token<P>(&mut self, lit: &str, problem: P) -> PResult<(), C, P> {
        if self.rest().starts_with(lit) {
            for c in lit.chars() {
                self.advance(c);
            }
            Ok(())
        } else {
            self.fail(problem)
        }
    }

    /// Consumes one character satisfying `pred`.
    pub fn chomp_if<P>(&mut self, pred: impl Fn(char) -> bool, problem: P) -> PResult<char, C, P> {
        match self.rest().chars().next() {
            Some(c) if pred(c) => {
                self.advance(c);
                Ok(c)
            }
            _ => self.fail(problem),
        }
    }

    /// Consumes zero or more characters satisfying `pred`. Never fails.
    pub fn chomp_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let src = self.src;
        let start = self.offset;
        while let Some(c) = src[self.offset..].chars().next() {
            if !pred(c) {
                break;
            }
            self.advance(c);
        }
        &src[start..self.offset]
    }

    /// Consumes one or more characters satisfying `pred`, failing with
    /// `problem` if the first character does not match.
    pub fn chomp_while1<P>(
        &mut self,
        problem: P,
        pred: impl Fn(char) -> bool,
    ) -> PResult<&'a str, C, P> {
        let chomped = self.chomp_while(pred);
        if chomped.is_empty() {
            self.fail(problem)
        } else {
            Ok(chomped)
        }
    }
}

/// Runs `parse` with `context` pushed onto the cursor's context stack. Dead
/// ends produced inside see the context; the stack is restored on exit either
/// way, so only contexts still open at the failure point are recorded.
pub fn in_context<'a, T, C: Clone, P>(
    cur: &mut Cursor<'a, C>,
    context: C,
    parse: impl FnOnce(&mut Cursor<'a, C>) -> PResult<T, C, P>,
) -> PResult<T, C, P> {
    cur.context.push(context);
    let step = parse(cur);
    cur.context.pop();
    step
}

/// Tries each alternative in order against the same start position and
/// returns the first success.
///
/// A committed failure aborts the alternation and surfaces that alternative's
/// dead ends alone. If every alternative fails uncommitted, the cursor is
/// rewound and the dead ends of all attempts are aggregated, first attempt
/// first.
pub fn one_of<T, C: Clone, P>(
    cur: &mut Cursor<'_, C>,
    alternatives: &[for<'s, 'b> fn(&'s mut Cursor<'b, C>) -> PResult<T, C, P>],
) -> PResult<T, C, P> {
    let mark = cur.mark();
    let mut dead_ends = Vec::new();
    for alternative in alternatives {
        match alternative(cur) {
            Ok(value) => return Ok(value),
            Err(failure) if failure.committed => return Err(failure),
            Err(failure) => {
                dead_ends.extend(failure.dead_ends);
                cur.rewind(mark);
            }
        }
    }
    Err(Failure {
        committed: false,
        dead_ends,
    })
}

/// Runs `parse`, treating an uncommitted failure as absence.
pub fn optional<'a, T, C: Clone, P>(
    cur: &mut Cursor<'a, C>,
    parse: impl FnOnce(&mut Cursor<'a, C>) -> PResult<T, C, P>,
) -> PResult<Option<T>, C, P> {
    let mark = cur.mark();
    match parse(cur) {
        Ok(value) => Ok(Some(value)),
        Err(failure) if failure.committed => Err(failure),
        Err(_) => {
            cur.rewind(mark);
            Ok(None)
        }
    }
}

/// Whether a separator may sit between the last item and the closing
/// delimiter of a [`sequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trailing {
    /// `[1, 2]` — a separator directly before the closing delimiter is an
    /// error.
    Forbidden,
    /// `[1, 2]` or `[1, 2,]`.
    Optional,
    /// `[1, 2,]` — every item must be followed by a separator.
    Mandatory,
}

/// The delimiters of a [`sequence`], each paired with the problem reported
/// when it is missing.
#[derive(Debug, Clone)]
pub struct Delimited<P> {
    pub start: (&'static str, P),
    pub separator: (&'static str, P),
    pub end: (&'static str, P),
    pub trailing: Trailing,
}

/// Parses `start (item (separator item)*)? end` with `spaces` run between
/// every pair of tokens, honouring the trailing-separator policy.
///
/// Once the start token is consumed every failure is committed. When neither
/// a separator nor the end delimiter follows an item, both dead ends are
/// reported with the separator's first, so the surfaced diagnostic prefers
/// "expected a separator" over "expected the terminator".
pub fn sequence<'a, T, C: Clone, P: Clone>(
    cur: &mut Cursor<'a, C>,
    delimited: &Delimited<P>,
    spaces: fn(&mut Cursor<'a, C>),
    item: fn(&mut Cursor<'a, C>) -> PResult<T, C, P>,
) -> PResult<Vec<T>, C, P> {
    cur.token(delimited.start.0, delimited.start.1.clone())?;
    spaces(cur);

    let mut items = Vec::new();

    // First item, or an immediately closed sequence.
    let mark = cur.mark();
    match item(cur) {
        Ok(value) => items.push(value),
        Err(failure) if failure.committed => return Err(failure),
        Err(failure) => {
            cur.rewind(mark);
            return match cur.token(delimited.end.0, delimited.end.1.clone()) {
                Ok(()) => Ok(items),
                Err(end_failure) => {
                    let mut dead_ends = failure.dead_ends;
                    dead_ends.extend(end_failure.dead_ends);
                    Err(Failure {
                        committed: true,
                        dead_ends,
                    })
                }
            };
        }
    }

    loop {
        spaces(cur);
        let mark = cur.mark();
        match cur.token(delimited.separator.0, delimited.separator.1.clone()) {
            Ok(()) => {
                spaces(cur);
                match delimited.trailing {
                    Trailing::Forbidden => {
                        items.push(item(cur).map_err(|failure| failure.committed_if(true))?);
                    }
                    Trailing::Optional | Trailing::Mandatory => {
                        let item_mark = cur.mark();
                        match item(cur) {
                            Ok(value) => items.push(value),
                            Err(failure) if failure.committed => return Err(failure),
                            Err(_) => {
                                // Trailing separator: the end must follow.
                                cur.rewind(item_mark);
                                return cur
                                    .token(delimited.end.0, delimited.end.1.clone())
                                    .map(|()| items)
                                    .map_err(|failure| failure.committed_if(true));
                            }
                        }
                    }
                }
            }
            Err(separator_failure) => {
                cur.rewind(mark);
                if delimited.trailing == Trailing::Mandatory {
                    return Err(separator_failure.committed_if(true));
                }
                return match cur.token(delimited.end.0, delimited.end.1.clone()) {
                    Ok(()) => Ok(items),
                    Err(end_failure) => {
                        let mut dead_ends = separator_failure.dead_ends;
                        dead_ends.extend(end_failure.dead_ends);
                        Err(Failure {
                            committed: true,
                            dead_ends,
                        })
                    }
                };
            }
        }
    }
}
