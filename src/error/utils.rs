use std::error::Error as StdError;

struct It<'a> {
    curr_source: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Iterator for It<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        match self.curr_source {
            None => None,
            Some(err) => {
                let next_src = err.source();
                self.curr_source = next_src;
                Some(err)
            }
        }
    }
}

/// Iterates over `err` followed by its transitive sources.
pub fn error_chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    It {
        curr_source: Some(err),
    }
}
