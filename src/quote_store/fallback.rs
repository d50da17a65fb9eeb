use super::models::{NewQuote, QuoteSource};

pub struct FallbackQuote {
    pub text: &'static str,
    pub song: &'static str,
    pub album: &'static str,
    pub year: i32,
}

/// Used when no lyrics provider is configured or reachable.
pub const FALLBACK_QUOTES: &[FallbackQuote] = &[
    FallbackQuote {
        text: "Don't stop 'til you get enough",
        song: "Don't Stop 'Til You Get Enough",
        album: "Off the Wall",
        year: 1979,
    },
    FallbackQuote {
        text: "Billie Jean is not my lover",
        song: "Billie Jean",
        album: "Thriller",
        year: 1982,
    },
    FallbackQuote {
        text: "Beat it, beat it, beat it, beat it",
        song: "Beat It",
        album: "Thriller",
        year: 1982,
    },
    FallbackQuote {
        text: "I'm starting with the man in the mirror",
        song: "Man in the Mirror",
        album: "Bad",
        year: 1987,
    },
    FallbackQuote {
        text: "You are not alone, I am here with you",
        song: "You Are Not Alone",
        album: "HIStory: Past, Present and Future, Book I",
        year: 1995,
    },
    FallbackQuote {
        text: "We are the world, we are the children",
        song: "We Are the World",
        album: "We Are the World",
        year: 1985,
    },
    FallbackQuote {
        text: "The way you make me feel",
        song: "The Way You Make Me Feel",
        album: "Bad",
        year: 1987,
    },
    FallbackQuote {
        text: "Smooth criminal, smooth criminal",
        song: "Smooth Criminal",
        album: "Bad",
        year: 1987,
    },
    FallbackQuote {
        text: "Black or white, it don't matter to me",
        song: "Black or White",
        album: "Dangerous",
        year: 1991,
    },
    FallbackQuote {
        text: "Heal the world, make it a better place",
        song: "Heal the World",
        album: "Dangerous",
        year: 1991,
    },
];

/// The fallback set as insertable quotes attributed to `author`.
pub fn fallback_quotes(author: &str, tags: &[String]) -> Vec<NewQuote> {
    FALLBACK_QUOTES
        .iter()
        .map(|q| {
            NewQuote::new(q.text, q.song, author, QuoteSource::Fallback)
                .with_album(Some(q.album))
                .with_year(Some(q.year))
                .with_tags(tags.to_vec())
        })
        .collect()
}
