//! Scenario corpus: Markdown inputs paired with expected HTML, compared
//! whitespace-normalized the way the upstream harness compares parsed
//! documents (whitespace between elements is insignificant).

use anyhow::{ensure, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref INTER_TAG_WHITESPACE: Regex = Regex::new(r">\s+<").expect("regex");
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("regex");
}

fn normalize(html: &str) -> String {
    let collapsed = INTER_TAG_WHITESPACE.replace_all(html, "><");
    WHITESPACE_RUN.replace_all(&collapsed, " ").trim().to_string()
}

fn check(name: &str, input: &str, expected: &str) -> Result<()> {
    let output = paperdown::to_html(input)?;
    ensure!(
        normalize(&output) == normalize(expected),
        "{name}: for input {input:?}\n  expected {expected:?}\n  got      {output:?}"
    );
    Ok(())
}

#[test]
fn headers() -> Result<()> {
    check("atx", "# Hello", "<h1>Hello</h1>\n")?;
    check("atx deep", "###### Six", "<h6>Six</h6>\n")?;
    check("atx trailing", "## Two ##", "<h2>Two</h2>\n")?;
    check("setext one", "Hello\n=====", "<h1>Hello</h1>\n")?;
    check("setext two", "Hello\n-----", "<h2>Hello</h2>\n")?;
    check(
        "setext then text",
        "Hello\n=====\nWorld",
        "<h1>Hello</h1>\n<p>World</p>\n",
    )?;
    check(
        "header with link",
        "# [x](/u)",
        "<h1><a href=\"/u\">x</a></h1>\n",
    )
}

#[test]
fn quotes() -> Result<()> {
    check(
        "quote",
        "> a\n> b",
        "<blockquote>\n<p>a\nb</p>\n</blockquote>\n",
    )?;
    check(
        "nested quote",
        "> a\n> > b",
        "<blockquote>\n<p>a</p>\n<blockquote>\n<p>b</p>\n</blockquote>\n</blockquote>\n",
    )?;
    check(
        "quote with code",
        ">     code",
        "<blockquote>\n<pre><code>code</code></pre>\n</blockquote>\n",
    )?;
    check(
        "quote with list",
        "> - a\n> - b",
        "<blockquote>\n<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n</blockquote>\n",
    )
}

#[test]
fn lists() -> Result<()> {
    check("tight", "- a\n- b", "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n")?;
    check(
        "loose",
        "- a\n\n- b",
        "<ul>\n<li><p>a</p>\n</li>\n<li><p>b</p>\n</li>\n</ul>\n",
    )?;
    check(
        "ordered",
        "1. one\n2. two",
        "<ol>\n<li>one</li>\n<li>two</li>\n</ol>\n",
    )?;
    check(
        "nested",
        "- a\n  - b",
        "<ul>\n<li>a<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n",
    )?;
    check(
        "lazy continuation",
        "- line one\ncontinued",
        "<ul>\n<li>line one\ncontinued</li>\n</ul>\n",
    )?;
    check(
        "bullet flavors",
        "+ a\n+ b",
        "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n",
    )
}

#[test]
fn code_blocks() -> Result<()> {
    check(
        "indented",
        "    code\n    more",
        "<pre><code>code\nmore</code></pre>\n",
    )?;
    check("tab indented", "\tfn x()", "<pre><code>fn x()</code></pre>\n")?;
    check(
        "escapes specials",
        "    <b> & \"q\"",
        "<pre><code>&lt;b&gt; &amp; &quot;q&quot;</code></pre>\n",
    )?;
    check(
        "interior blank",
        "    a\n\n    b",
        "<pre><code>a\n\nb</code></pre>\n",
    )?;
    check(
        "extra indentation survives",
        "    a\n      b",
        "<pre><code>a\n  b</code></pre>\n",
    )
}

#[test]
fn rulers() -> Result<()> {
    check("stars", "***", "<hr/>\n")?;
    check("spaced stars", "* * *", "<hr/>\n")?;
    check("dashes", "---", "<hr/>\n")?;
    check("underscores", "___", "<hr/>\n")?;
    check("hr tag alone", "<hr/>", "<hr/>\n")?;
    check("hr open tag alone", "<hr>", "<hr/>\n")
}

#[test]
fn emphasis() -> Result<()> {
    check("italic star", "*i*", "<p><em>i</em></p>\n")?;
    check("italic underscore", "_i_", "<p><em>i</em></p>\n")?;
    check("bold", "**b**", "<p><strong>b</strong></p>\n")?;
    check(
        "bold italic",
        "***bold italic***",
        "<p><strong><em>bold italic</em></strong></p>\n",
    )?;
    check(
        "cross delimiter stays literal",
        "*a_b*",
        "<p><em>a_b</em></p>\n",
    )?;
    check("unclosed", "a * b", "<p>a * b</p>\n")
}

#[test]
fn code_spans() -> Result<()> {
    check("simple", "`x`", "<p><code>x</code></p>\n")?;
    check(
        "double backtick",
        "``a ` b``",
        "<p><code>a ` b</code></p>\n",
    )?;
    check(
        "one layer of padding comes off",
        "` x `",
        "<p><code>x</code></p>\n",
    )?;
    check(
        "inner padding survives",
        "`  a  `",
        "<p><code> a </code></p>\n",
    )?;
    check("escaped content", "`a<b>`", "<p><code>a&lt;b&gt;</code></p>\n")
}

#[test]
fn links_and_images() -> Result<()> {
    check(
        "inline",
        "[t](http://e)",
        "<p><a href=\"http://e\">t</a></p>\n",
    )?;
    check(
        "inline with title",
        "[t](http://e \"T\")",
        "<p><a href=\"http://e\" title=\"T\">t</a></p>\n",
    )?;
    check(
        "referenced",
        "[foo][1]\n\n[1]: http://x \"t\"",
        "<p><a href=\"http://x\" title=\"t\">foo</a></p>\n",
    )?;
    check(
        "implicit reference",
        "[foo][]\n\n[foo]: /f",
        "<p><a href=\"/f\">foo</a></p>\n",
    )?;
    check(
        "shortcut reference",
        "[foo]\n\n[foo]: /f",
        "<p><a href=\"/f\">foo</a></p>\n",
    )?;
    check("unresolved", "[foo][gone]", "<p>[foo][gone]</p>\n")?;
    check(
        "title with inner quotes",
        "[x](/u \"a \"b\" c\")",
        "<p><a href=\"/u\" title=\"a &quot;b&quot; c\">x</a></p>\n",
    )?;
    check(
        "angle url",
        "[x](</with space>)",
        "<p><a href=\"/with space\">x</a></p>\n",
    )?;
    check(
        "image inline",
        "![alt](/i \"T\")",
        "<p><img src=\"/i\" alt=\"alt\" title=\"T\"/></p>\n",
    )?;
    check(
        "image referenced",
        "![img][1]\n\n[1]: /i",
        "<p><img src=\"/i\" alt=\"img\"/></p>\n",
    )?;
    check(
        "image unresolved",
        "![alt][none]",
        "<p><img src=\"\" alt=\"alt\"/></p>\n",
    )?;
    check(
        "autolink",
        "<http://example.com>",
        "<p><a href=\"http://example.com\">http://example.com</a></p>\n",
    )?;
    check(
        "emphasis inside link text",
        "[*em* x](/u)",
        "<p><a href=\"/u\"><em>em</em> x</a></p>\n",
    )?;
    check(
        "image inside link text",
        "[![alt](/i) go](/u)",
        "<p><a href=\"/u\"><img src=\"/i\" alt=\"alt\"/> go</a></p>\n",
    )?;
    check(
        "tag inside link text",
        "[<span>x</span>](/u)",
        "<p><a href=\"/u\"><span>x</span></a></p>\n",
    )?;
    check(
        "autolink inside link text",
        "[<http://x> label](/u)",
        "<p><a href=\"/u\"><a href=\"http://x\">http://x</a> label</a></p>\n",
    )
}

#[test]
fn html_passthrough() -> Result<()> {
    check(
        "balanced block",
        "<div class=\"x\">\nhi\n</div>",
        "<div class=\"x\">\nhi\n</div>",
    )?;
    check(
        "inline span",
        "a <span>b</span> c",
        "<p>a <span>b</span> c</p>\n",
    )?;
    check("empty tag", "before <br/> after", "<p>before <br/> after</p>\n")?;
    check("comment", "<!-- hidden -->", "<!-- hidden -->")
}

#[test]
fn entities() -> Result<()> {
    check(
        "pass through unescaped",
        "&amp; &#169; &#x1F;",
        "<p>&amp; &#169; &#x1F;</p>\n",
    )?;
    check("bare ampersand", "a & b", "<p>a &amp; b</p>\n")
}

#[test]
fn documents() -> Result<()> {
    check(
        "mixed blocks",
        "# Title\n\nIntro text.\n\n- one\n- two\n\nClosing words.\n\n    code()\n",
        "<h1>Title</h1>\n<p>Intro text.</p>\n<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n<p>Closing words.</p>\n<pre><code>code()</code></pre>\n",
    )?;
    check(
        "code inside an item",
        "- a\n        fenced_by_indent()",
        "<ul>\n<li>a<pre><code>fenced_by_indent()</code></pre>\n</li>\n</ul>\n",
    )?;
    check(
        "paragraph break",
        "a\n\nb",
        "<p>a</p>\n<p>b</p>\n",
    )?;
    check(
        "hard break",
        "a  \nb",
        "<p>a<br/>\nb</p>\n",
    )
}

#[test]
fn totality_over_corpus_mutations() -> Result<()> {
    // Every prefix of a busy document must parse or fail cleanly, never
    // hang; prefixes cut constructs mid-way.
    let corpus = "# T\n> q *em* `c`\n- [l][1]\n\n  ![i](/u \"t\")\n\n[1]: /r\n<div a=\"b\">x</div>\n***\n";
    for end in corpus.char_indices().map(|(i, _)| i) {
        let _ = paperdown::to_html(&corpus[..end]);
    }
    Ok(())
}
