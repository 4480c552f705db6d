/// ## Reserved words of the script language
///
/// A keyword matches when the line starts with it, ignoring case, and
/// the keyword is followed by a space or the end of the line.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Delay,
    Set,
    If,
    Do,
    While,
    Endif,
    Forever,
    Endwhile,
    Until,
    Clear,
    Run,
    Else,
    Wait,
    Stop,
    Begin,
    End,
    Print,
    Println,
    Break,
    Continue,
}

const KEYWORDS: [(&str, Keyword); 20] = [
    ("delay", Keyword::Delay),
    ("set", Keyword::Set),
    ("if", Keyword::If),
    ("do", Keyword::Do),
    ("while", Keyword::While),
    ("endif", Keyword::Endif),
    ("forever", Keyword::Forever),
    ("endwhile", Keyword::Endwhile),
    ("until", Keyword::Until),
    ("clear", Keyword::Clear),
    ("run", Keyword::Run),
    ("else", Keyword::Else),
    ("wait", Keyword::Wait),
    ("stop", Keyword::Stop),
    ("begin", Keyword::Begin),
    ("end", Keyword::End),
    ("print", Keyword::Print),
    ("println", Keyword::Println),
    ("break", Keyword::Break),
    ("continue", Keyword::Continue),
];

impl Keyword {
    /// Returns the keyword at the start of `text` and its length.
    pub fn lookup(text: &[u8]) -> Option<(Keyword, usize)> {
        KEYWORDS.iter().find_map(|(word, keyword)| {
            let len = word.len();
            let head = text.get(..len)?;
            if !head.eq_ignore_ascii_case(word.as_bytes()) {
                return None;
            }
            match text.get(len) {
                None | Some(b' ') => Some((*keyword, len)),
                Some(_) => None,
            }
        })
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let word = KEYWORDS
            .iter()
            .find(|(_, k)| k == self)
            .map_or("", |(w, _)| *w);
        write!(f, "{}", word.to_ascii_uppercase())
    }
}
