//! Round-trip coverage: decode a section fragment, dump it as edit
//! events, encode it again, and require the exact input bytes back.

use pretty_assertions::assert_eq;
use rstest::rstest;

use novx_writer_codec::{
    CodecError, decode_section, edit_events, encode_section, validate_section,
};

const FOOTNOTE: &str = "<p>This is a regular line\
    <note id=\"ftn0\" class=\"footnote\">\
    <note-citation>1</note-citation>\
    <p>This is a footnote</p></note>\
    \u{20}of the test section</p>";

const FORMATTED_SPAN: &str =
    "<p>This is <em><span xml:lang=\"en-US\">emhasized AE</span></em> Text</p>";

const HEADING_AND_LIST: &str = "<h5>Heading style paragraph</h5>\
    <ul>\
    <li><p>One</p></li>\
    <li><p><em>Two</em></p></li>\
    </ul>";

const HEADING_ENDING_WITH_COMMENT: &str = "<h6>Any text <comment><creator>W.C. Hack</creator>\
    <date>2024-04-29T07:47:52.35</date><p>Note this.</p></comment></h6>";

const LIST_AND_HEADING: &str = "<ul>\
    <li><p>One</p></li>\
    <li><p><em>Two</em></p></li>\
    </ul>\
    <h5>Heading style paragraph</h5>";

const LIST_AND_TAGGED_PARAGRAPH: &str = "<ul>\
    <li><p>One</p></li>\
    <li><p><em>Two</em></p></li>\
    </ul>\
    <p style=\"quotations\">Tagged paragraph</p>";

const LIST_AND_UNTAGGED_PARAGRAPH: &str = "<ul>\
    <li><p>One</p></li>\
    <li><p><em>Two</em></p></li>\
    </ul>\
    <p>Untagged paragraph</p>";

const LIST_BETWEEN_TAGGED_PARAGRAPHS: &str = "<p style=\"quotations\">Tagged paragraph</p>\
    <ul>\
    <li><p>One</p></li>\
    <li><p><em>Two</em></p></li>\
    </ul>\
    <p style=\"quotations\">Tagged paragraph</p>";

const LIST_BETWEEN_UNTAGGED_PARAGRAPHS: &str = "<p>Untagged paragraph</p>\
    <ul>\
    <li><p>One</p></li>\
    <li><p><em>Two</em></p></li>\
    </ul>\
    <p>Untagged paragraph</p>";

const LIST_SINGLE_ELEMENT: &str = "<ul><li><p>One</p></li></ul>";

const LIST_TWO_ELEMENTS: &str = "<ul>\
    <li><p>One</p></li>\
    <li><p><em>Two</em></p></li>\
    </ul>";

const MULTIPLE_SPANS: &str = "<p>This is <em><span xml:lang=\"en-US\">emphasized AE</span></em> \
    Text. <span xml:lang=\"en-GB\">plain BE text.</span></p>";

const NESTED_FORMATS: &str = "<p>This is <strong><em>double-formatted</em></strong> Text</p>";

const TAGGED_AND_UNTAGGED_PARAGRAPHS: &str =
    "<p style=\"quotations\">This is the <em>eighth line</em> of the test section</p>\
    <p>Paragraph <em>emphasized</em></p>";

const TAGGED_PARAGRAPH: &str =
    "<p style=\"quotations\">This is the <em>eighth line</em> of the test section</p>";

const TAGGED_PARAGRAPH_AND_LIST: &str = "<p style=\"quotations\">Tagged paragraph</p>\
    <ul>\
    <li><p>One</p></li>\
    <li><p><em>Two</em></p></li>\
    </ul>";

const TAGGED_PARAGRAPH_ENDING_WITH_COMMENT: &str =
    "<p xml:lang=\"en-US\">Any text <comment><creator>W.C. Hack</creator>\
    <date>2024-04-29T07:47:52.35</date><p>Note this.</p></comment></p>";

const TAGGED_PARAGRAPH_LIST_UNTAGGED_PARAGRAPH: &str =
    "<p style=\"quotations\">Tagged paragraph</p>\
    <ul>\
    <li><p>One</p></li>\
    <li><p><em>Two</em></p></li>\
    </ul>\
    <p>Untagged paragraph</p>";

const TAGGED_PARAGRAPH_STARTING_WITH_EM: &str =
    "<p xml:lang=\"en-US\"><em>Emphasized Paragraph start.</em> Regular end.</p>";

const TAGGED_PARAGRAPH_STARTING_WITH_SPAN: &str =
    "<p xml:lang=\"en-GB\"><span xml:lang=\"en-US\">This AE text,</span> and this is BE.</p>";

const UNTAGGED_AND_TAGGED_PARAGRAPHS: &str = "<p>Paragraph <em>emphasized</em></p>\
    <p style=\"quotations\">This is the <em>eighth line</em> of the test section</p>";

const UNTAGGED_PARAGRAPH: &str = "<p>Paragraph <em>emphasized</em></p>";

const UNTAGGED_PARAGRAPH_AND_LIST: &str = "<p>Untagged paragraph</p>\
    <ul>\
    <li><p>One</p></li>\
    <li><p><em>Two</em></p></li>\
    </ul>";

const UNTAGGED_PARAGRAPH_ENDING_WITH_COMMENT: &str =
    "<p>Regular text<comment><creator>W.C. Hack</creator>\
    <date>2024-04-29T07:47:52.35</date><p>Note this.</p></comment></p>";

const UNTAGGED_PARAGRAPH_ENDING_WITH_EM: &str =
    "<p>Regular Paragraph start. <em>Emphasized end.</em></p>";

const UNTAGGED_PARAGRAPH_LIST_TAGGED_PARAGRAPH: &str = "<p>Untagged paragraph</p>\
    <ul>\
    <li><p>One</p></li>\
    <li><p><em>Two</em></p></li>\
    </ul>\
    <p style=\"quotations\">Tagged paragraph</p>";

const UNTAGGED_PARAGRAPH_STARTING_WITH_COMMENT: &str =
    "<p><comment><creator>W.C. Hack</creator>\
    <date>2024-04-29T07:47:52.35</date><p>Note this.</p></comment>Regular text</p>";

const UNTAGGED_PARAGRAPH_STARTING_WITH_EM: &str =
    "<p><em>Emphasized Paragraph start.</em> Regular end.</p>";

const UNTAGGED_PARAGRAPH_STARTING_WITH_SPAN: &str =
    "<p><span xml:lang=\"en-US\">This AE text,</span> and this is default.</p>";

/// A whole section's worth of constructs in one fragment: breaks, every
/// heading level, nested formats, spans, styled paragraphs, a footnote,
/// lists, and comments with single- and multi-paragraph bodies.
const MIXED_SECTION: &str = "<p>This is the <em>first</em> line of the test section</p>\
    <p></p>\
    <p>This is the <strong>second</strong> line of the test section</p>\
    <h9 xml:lang=\"en-US\">heading 9</h9>\
    <p>This is the <strong><em>third</em></strong> line of the test section</p>\
    <p>This is the <em><strong>fourth</strong></em> line of the test section</p>\
    <p><em>This</em> is the &lt;fifth&gt; line of the test section</p>\
    <p>This is the <span xml:lang=\"en-US\">sixth</span> line of the test section</p>\
    <p><span xml:lang=\"en-US\">This is the seventh</span> line of the test section</p>\
    <p xml:lang=\"en-US\">This is the sixth line of the test section</p>\
    <p style=\"quotations\">This is the <em>eighth line</em> of the test section</p>\
    <p style=\"quotations\" xml:lang=\"en-US\">This is the <em>nineth</em> line of the test section</p>\
    <p xml:lang=\"en-US\">This is the <span xml:lang=\"en-GB\">tenth</span> line of the test section</p>\
    <p xml:lang=\"en-US\">This is the <em><span xml:lang=\"en-GB\">eleventh</span></em> line of the test section</p>\
    <h9>heading 9</h9>\
    <p>This is a regular line\
    <note id=\"ftn0\" class=\"footnote\">\
    <note-citation>1</note-citation>\
    <p>This is a footnote</p></note>\
    \u{20}of the test section</p>\
    <h8>heading 8</h8>\
    <ul>\
    <li><p>One</p></li>\
    <li><p><em>Two</em></p></li>\
    <li><p><em>Three</em></p></li>\
    </ul>\
    <p>Next line</p>\
    <h5>heading 5</h5>\
    <h6>heading 6</h6>\
    <p>Next line </p>\
    <h7>heading 7</h7>\
    <p>Next line</p>\
    <p><comment><creator>W.C. Hack</creator><date>2024-04-29T07:47:52.35</date><p>Note this.</p></comment></p>\
    <p>Next line</p>\
    <p><comment><creator>W.C. Hack</creator><date>2024-04-29T07:47:52.35</date><p>One.</p><p>Two.</p></comment></p>\
    <p>Next line</p>\
    <ul>\
    <li><p>One</p></li>\
    </ul>";

fn round_trip(xml: &str) -> String {
    let parsed = decode_section(xml).unwrap();
    let events = edit_events(&parsed.runs);
    encode_section(&events, &parsed.comments, &parsed.notes).unwrap()
}

#[rstest]
#[case::footnote(FOOTNOTE)]
#[case::formatted_span(FORMATTED_SPAN)]
#[case::heading_and_list(HEADING_AND_LIST)]
#[case::heading_ending_with_comment(HEADING_ENDING_WITH_COMMENT)]
#[case::list_and_heading(LIST_AND_HEADING)]
#[case::list_and_tagged_paragraph(LIST_AND_TAGGED_PARAGRAPH)]
#[case::list_and_untagged_paragraph(LIST_AND_UNTAGGED_PARAGRAPH)]
#[case::list_between_tagged_paragraphs(LIST_BETWEEN_TAGGED_PARAGRAPHS)]
#[case::list_between_untagged_paragraphs(LIST_BETWEEN_UNTAGGED_PARAGRAPHS)]
#[case::list_single_element(LIST_SINGLE_ELEMENT)]
#[case::list_two_elements(LIST_TWO_ELEMENTS)]
#[case::multiple_spans(MULTIPLE_SPANS)]
#[case::nested_formats(NESTED_FORMATS)]
#[case::tagged_and_untagged_paragraphs(TAGGED_AND_UNTAGGED_PARAGRAPHS)]
#[case::tagged_paragraph(TAGGED_PARAGRAPH)]
#[case::tagged_paragraph_and_list(TAGGED_PARAGRAPH_AND_LIST)]
#[case::tagged_paragraph_ending_with_comment(TAGGED_PARAGRAPH_ENDING_WITH_COMMENT)]
#[case::tagged_paragraph_list_untagged_paragraph(TAGGED_PARAGRAPH_LIST_UNTAGGED_PARAGRAPH)]
#[case::tagged_paragraph_starting_with_em(TAGGED_PARAGRAPH_STARTING_WITH_EM)]
#[case::tagged_paragraph_starting_with_span(TAGGED_PARAGRAPH_STARTING_WITH_SPAN)]
#[case::untagged_and_tagged_paragraphs(UNTAGGED_AND_TAGGED_PARAGRAPHS)]
#[case::untagged_paragraph(UNTAGGED_PARAGRAPH)]
#[case::untagged_paragraph_and_list(UNTAGGED_PARAGRAPH_AND_LIST)]
#[case::untagged_paragraph_ending_with_comment(UNTAGGED_PARAGRAPH_ENDING_WITH_COMMENT)]
#[case::untagged_paragraph_ending_with_em(UNTAGGED_PARAGRAPH_ENDING_WITH_EM)]
#[case::untagged_paragraph_list_tagged_paragraph(UNTAGGED_PARAGRAPH_LIST_TAGGED_PARAGRAPH)]
#[case::untagged_paragraph_starting_with_comment(UNTAGGED_PARAGRAPH_STARTING_WITH_COMMENT)]
#[case::untagged_paragraph_starting_with_em(UNTAGGED_PARAGRAPH_STARTING_WITH_EM)]
#[case::untagged_paragraph_starting_with_span(UNTAGGED_PARAGRAPH_STARTING_WITH_SPAN)]
#[case::mixed_section(MIXED_SECTION)]
#[case::empty("")]
fn encoding_restores_the_decoded_input(#[case] xml: &str) {
    assert_eq!(round_trip(xml), xml);
}

/// A second trip through the codec must not drift: the re-encoded bytes
/// decode to the same runs and annotations as the first pass.
#[rstest]
#[case(MIXED_SECTION)]
#[case(UNTAGGED_PARAGRAPH_STARTING_WITH_COMMENT)]
fn re_decoding_the_output_is_a_fixed_point(#[case] xml: &str) {
    let first = decode_section(xml).unwrap();
    let second = decode_section(&round_trip(xml)).unwrap();
    assert_eq!(first, second);
}

#[rstest]
#[case(FOOTNOTE)]
#[case(MIXED_SECTION)]
#[case(LIST_BETWEEN_TAGGED_PARAGRAPHS)]
fn encoder_output_passes_validation(#[case] xml: &str) {
    assert!(validate_section(&round_trip(xml)).is_ok());
}

/// A comment that opens its styled paragraph or heading loses the
/// wrapper: the annotation run carries only its reference, so the
/// re-encoded fragment wraps it in a plain paragraph. Asserted here so
/// the divergence is deliberate, not accidental.
#[rstest]
#[case::styled_heading(
    "<h5><comment><creator>W.C. Hack</creator><date>2024-04-29T07:47:52.35</date>\
    <p>Note this.</p></comment></h5>"
)]
#[case::styled_paragraph(
    "<p xml:lang=\"en-US\"><comment><creator>W.C. Hack</creator>\
    <date>2024-04-29T07:47:52.35</date><p>Note this.</p></comment></p>"
)]
fn comment_opening_a_styled_block_re_encodes_as_plain_paragraph(#[case] xml: &str) {
    let out = round_trip(xml);
    assert_eq!(
        out,
        "<p><comment><creator>W.C. Hack</creator><date>2024-04-29T07:47:52.35</date>\
        <p>Note this.</p></comment></p>"
    );
}

#[test]
fn endnotes_are_rejected_up_front() {
    let xml = "<p>Line\
        <note id=\"ftn1\" class=\"endnote\">\
        <note-citation>i</note-citation>\
        <p>This is an endnote.</p></note>\
        \u{20}end</p>";
    match decode_section(xml) {
        Err(CodecError::Unsupported(message)) => {
            assert!(message.contains("endnote"), "unexpected message: {message}");
        }
        other => panic!("expected unsupported error, got {other:?}"),
    }
}

#[test]
fn decoder_recovers_after_a_failure() {
    assert!(decode_section("<p>broken").is_err());
    // A failed call leaves no state behind; the next one works.
    assert_eq!(round_trip(UNTAGGED_PARAGRAPH), UNTAGGED_PARAGRAPH);
}

#[test]
fn malformed_markup_reports_fragment_relative_position() {
    match decode_section("<p>a</q>") {
        Err(CodecError::Markup { line, column, .. }) => {
            assert_eq!(line, 1);
            assert!(column > 0);
        }
        other => panic!("expected markup error, got {other:?}"),
    }
}

/// The parsed form is a serialization surface for session persistence;
/// pin the shape down.
#[test]
fn parsed_section_survives_serde() {
    let parsed = decode_section(MIXED_SECTION).unwrap();
    let json = serde_json::to_string(&parsed).unwrap();
    let restored: novx_writer_codec::ParsedSection = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, restored);
}
