use unicode_segmentation::UnicodeSegmentation;

use super::{App, FindHit, FindInput};

impl App {
    pub fn open_find(&mut self, backwards: bool) {
        self.find_input = Some(FindInput {
            buffer: String::new(),
            backwards,
        });
    }

    pub fn commit_find(&mut self) {
        let Some(fi) = self.find_input.take() else {
            return;
        };
        self.find_query = if fi.buffer.is_empty() { None } else { Some(fi.buffer) };
        self.find_backwards = fi.backwards;
        self.recompute_find_hits();
        self.select_hit_from_cursor();
        self.reveal_current_find_hit();
    }

    pub fn recompute_find_hits(&mut self) {
        self.find_hits.clear();
        let Some(q) = &self.find_query else {
            return;
        };
        if q.is_empty() {
            return;
        }
        let doc = &self.docs[self.current];
        for (li, line) in doc.lines.iter().enumerate() {
            let mut start = 0usize;
            while let Some(pos) = line[start..].find(q.as_str()) {
                let s = start + pos;
                let e = s + q.len();
                self.find_hits.push(FindHit {
                    line_idx: li,
                    start: s,
                    end: e,
                });
                start = e;
            }
        }
    }

    /// First hit after the cursor (before it for `?`), wrapping around.
    fn select_hit_from_cursor(&mut self) {
        if self.find_hits.is_empty() {
            if let Some(q) = &self.find_query {
                let msg = crate::strings::pattern_not_found(q);
                self.lifecycle.dialog_mut().set_info(msg);
            }
            return;
        }
        let doc = &self.docs[self.current];
        let here = (doc.row, byte_offset(&doc.lines[doc.row], doc.col));
        let pos = |h: &FindHit| (h.line_idx, h.start);
        self.find_current = if self.find_backwards {
            self.find_hits
                .iter()
                .rposition(|h| pos(h) < here)
                .unwrap_or(self.find_hits.len() - 1)
        } else {
            self.find_hits
                .iter()
                .position(|h| pos(h) > here)
                .unwrap_or(0)
        };
    }

    pub fn next_find_hit(&mut self) {
        if self.find_hits.is_empty() {
            return;
        }
        if self.find_backwards {
            self.step_back();
        } else {
            self.step_forward();
        }
        self.reveal_current_find_hit();
    }

    pub fn prev_find_hit(&mut self) {
        if self.find_hits.is_empty() {
            return;
        }
        if self.find_backwards {
            self.step_forward();
        } else {
            self.step_back();
        }
        self.reveal_current_find_hit();
    }

    fn step_forward(&mut self) {
        self.find_current = (self.find_current + 1) % self.find_hits.len();
    }

    fn step_back(&mut self) {
        if self.find_current == 0 {
            self.find_current = self.find_hits.len() - 1;
        } else {
            self.find_current -= 1;
        }
    }

    pub fn reveal_current_find_hit(&mut self) {
        let Some(hit) = self.find_hits.get(self.find_current).cloned() else {
            return;
        };
        let doc = &mut self.docs[self.current];
        doc.row = hit.line_idx;
        doc.col = doc.lines[hit.line_idx][..hit.start].graphemes(true).count();
    }
}

fn byte_offset(line: &str, col: usize) -> usize {
    line.grapheme_indices(true)
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

#[cfg(test)]
mod tests {
    use super::super::tests::app_with_lines;

    #[test]
    fn find_moves_to_next_hit_and_wraps() {
        let mut app = app_with_lines(&["foo bar", "bar foo", "foo"]);
        app.open_find(false);
        app.find_input.as_mut().unwrap().buffer = "foo".into();
        app.commit_find();
        assert_eq!(app.find_hits.len(), 3);
        assert_eq!((app.current_doc().row, app.current_doc().col), (1, 4));
        app.next_find_hit();
        assert_eq!(app.current_doc().row, 2);
        app.next_find_hit();
        assert_eq!((app.current_doc().row, app.current_doc().col), (0, 0));
        app.prev_find_hit();
        assert_eq!(app.current_doc().row, 2);
    }

    #[test]
    fn backwards_find_reverses_n() {
        let mut app = app_with_lines(&["x", "x", "x"]);
        app.current_doc_mut().row = 1;
        app.open_find(true);
        app.find_input.as_mut().unwrap().buffer = "x".into();
        app.commit_find();
        assert_eq!(app.current_doc().row, 0);
        app.next_find_hit();
        assert_eq!(app.current_doc().row, 2);
    }

    #[test]
    fn no_match_reports_in_bar() {
        let mut app = app_with_lines(&["abc"]);
        app.open_find(false);
        app.find_input.as_mut().unwrap().buffer = "zzz".into();
        app.commit_find();
        assert!(app.find_hits.is_empty());
        assert_eq!(app.lifecycle.dialog().status().info, "Pattern not found: zzz");
    }
}
