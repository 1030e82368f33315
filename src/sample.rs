//! The fixed document the editor opens with.
//!
//! Exercises every construct the renderer understands, so a fresh start
//! doubles as a feature tour.

/// Startup document for the editor buffer.
pub const SAMPLE_DOCUMENT: &str = r#"# Welcome to Inkdown

Type markdown on the left, watch it render on the right. When it looks
good, **copy it as rich text** or **export it as a PDF** — both read the
rendered preview, so what you see is what you ship.

## Formatting

Inline styles work the way you expect: **bold**, *italic*, `code`, and
~~strikethrough~~. Bare links are picked up automatically, like
https://www.markdownguide.org, and [named links](https://commonmark.org)
too.

> Markdown is meant to be readable as plain text first.
> The rendered form is a bonus, not the point.

## Code

Fenced blocks are colored by their language tag:

```javascript
function greet(name) {
  const message = `Hello, ${name}!`;
  return message.toUpperCase();
}
```

Blocks without a recognized tag fall back to plain code styling:

```
no language here
```

## Tables and lists

| Action     | Keys   | Notes                     |
|------------|--------|---------------------------|
| Copy       | Ctrl+Y | HTML with plain-text fallback |
| Export PDF | Ctrl+P | A4, written to `markdown-export.pdf` |
| Help       | F1     | Full key reference        |

1. Edit on the left
2. Check the preview
3. Export

- Works offline
- Nothing is saved anywhere

---

That's the tour. Select all, delete, and start writing.
"#;
