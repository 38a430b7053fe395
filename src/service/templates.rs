//! Canned response templates for the MUN preparation tasks.
//!
//! Every known task renders a heading, the delegate's prompt quoted verbatim,
//! and a fixed list of numbered sections. Unknown task names fall back to a
//! one-line generic reply. Rendering is pure: the same (task, prompt) always
//! yields the same text.

/// One numbered section of a task template.
pub struct Section {
    pub heading: &'static str,
    pub guidance: &'static str,
}

const fn section(heading: &'static str, guidance: &'static str) -> Section {
    Section { heading, guidance }
}

const AMENDMENTS: &[Section] = &[
    section("Clause Under Review", "Identify the operative clause and the exact wording to change."),
    section("Proposed Amendment", "State the amendment as add, strike or modify, in formal resolution language."),
    section("Justification", "Explain how the change strengthens the resolution or protects your delegation's interests."),
    section("Friendly vs. Unfriendly", "Assess whether the sponsors are likely to accept the change without a vote."),
];

const SITUATION_ASSESSMENT: &[Section] = &[
    section("Current Situation", "Summarise the facts on the ground and the latest developments."),
    section("Key Actors", "List the states, blocs and non-state actors with a stake in the outcome."),
    section("Risks and Flashpoints", "Highlight what could escalate and on what timeline."),
    section("Immediate Priorities", "Recommend the first actions committee should take."),
];

const DIRECTIVE: &[Section] = &[
    section("Directive Title", "Give the directive a short, descriptive title."),
    section("Sponsors and Signatories", "List the portfolios or delegates authorising the action."),
    section("Actions Ordered", "Number each concrete action, with the resources it commits."),
    section("Expected Outcome", "Describe the intended effect and how crisis staff should measure it."),
];

const DRAFT_RESOLUTION: &[Section] = &[
    section("Preambulatory Clauses", "Recall relevant treaties, prior resolutions and guiding principles."),
    section("Operative Clauses", "Number each action the committee resolves to take, starting with a strong verb."),
    section("Funding and Implementation", "Name the bodies responsible and how the measures are financed."),
    section("Sponsors and Signatories", "Identify likely co-sponsors and states to approach for signatures."),
];

const BACKGROUND_GUIDE: &[Section] = &[
    section("Historical Context", "Trace how the issue developed and the turning points that shaped it."),
    section("Past International Action", "Review UN resolutions, treaties and initiatives already attempted."),
    section("Country Position", "Outline your delegation's stated policy and voting record."),
    section("Questions a Resolution Should Answer", "List the open questions committee must address."),
];

const POINTS_AND_RIGHT_OF_REPLY: &[Section] = &[
    section("Point of Information", "Draft a concise question to the speaker that exposes a gap in their argument."),
    section("Point of Order", "Identify any procedural error and the rule it violates."),
    section("Right to Reply", "Prepare a measured response to remarks that impugned your delegation."),
    section("Delivery Notes", "Keep it brief, courteous and directed through the chair."),
];

const POST_ASSESSMENT: &[Section] = &[
    section("Performance Summary", "Summarise your delegation's contributions during session."),
    section("Strengths", "Note the speeches, clauses and alliances that worked."),
    section("Areas for Improvement", "Identify missed opportunities and procedural slips."),
    section("Next Steps", "List what to prepare differently for the next conference."),
];

const PROBABLE_OUTCOMES: &[Section] = &[
    section("Most Likely Outcome", "Describe the result committee is currently heading towards."),
    section("Alternative Scenarios", "Sketch best-case and worst-case developments."),
    section("Deciding Factors", "Name the votes, blocs or events that would tip the balance."),
    section("Recommended Position", "Advise how to position your delegation for each scenario."),
];

const REBUTTAL: &[Section] = &[
    section("Opposing Argument", "Restate the argument fairly and precisely."),
    section("Counter-Points", "Answer each claim with evidence, precedent or a logical flaw."),
    section("Supporting Evidence", "Cite data, resolutions or expert sources that back your case."),
    section("Closing Line", "End with a short statement that reframes the debate."),
];

const RESEARCH: &[Section] = &[
    section("Overview", "Define the topic and why it is on the agenda."),
    section("Key Facts and Figures", "Gather statistics and dates you can quote in debate."),
    section("Stakeholder Positions", "Map where major states and blocs stand."),
    section("Sources to Consult", "List UN documents, think-tank reports and news coverage to read next."),
];

const SPEECH: &[Section] = &[
    section("Opening", "Address the chair and committee and state your delegation's stance."),
    section("Main Arguments", "Present two or three arguments, each backed by evidence."),
    section("Proposed Solutions", "Offer concrete measures your delegation supports."),
    section("Closing", "Finish with a call to action and yield the remaining time."),
];

const STRATEGY: &[Section] = &[
    section("Objectives", "Define what a successful outcome means for your delegation."),
    section("Allies and Blocs", "Identify natural partners and the bloc you should lead or join."),
    section("Negotiation Approach", "Plan what you can concede and what is non-negotiable."),
    section("Timeline", "Map actions to moderated caucus, unmoderated caucus and voting procedure."),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MunTask {
    Amendments,
    SituationAssessment,
    Directive,
    DraftResolution,
    BackgroundGuide,
    PointsAndRightOfReply,
    PostAssessment,
    ProbableOutcomes,
    Rebuttal,
    Research,
    Speech,
    Strategy,
}

impl MunTask {
    pub const ALL: [MunTask; 12] = [
        MunTask::Amendments,
        MunTask::SituationAssessment,
        MunTask::Directive,
        MunTask::DraftResolution,
        MunTask::BackgroundGuide,
        MunTask::PointsAndRightOfReply,
        MunTask::PostAssessment,
        MunTask::ProbableOutcomes,
        MunTask::Rebuttal,
        MunTask::Research,
        MunTask::Speech,
        MunTask::Strategy,
    ];

    /// Exact, case-sensitive match on the task name clients send.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|task| task.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MunTask::Amendments => "amendments",
            MunTask::SituationAssessment => "situation assessment",
            MunTask::Directive => "directive",
            MunTask::DraftResolution => "draft resolution",
            MunTask::BackgroundGuide => "background guide",
            MunTask::PointsAndRightOfReply => "poi/poo/r2r",
            MunTask::PostAssessment => "post assessment",
            MunTask::ProbableOutcomes => "probable outcomes",
            MunTask::Rebuttal => "rebuttal",
            MunTask::Research => "research",
            MunTask::Speech => "speech",
            MunTask::Strategy => "strategy",
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            MunTask::Amendments => "Amendment Drafting Support",
            MunTask::SituationAssessment => "Situation Assessment",
            MunTask::Directive => "Directive Draft",
            MunTask::DraftResolution => "Draft Resolution Framework",
            MunTask::BackgroundGuide => "Background Guide",
            MunTask::PointsAndRightOfReply => "Points of Information, Order and Right to Reply",
            MunTask::PostAssessment => "Post-Committee Assessment",
            MunTask::ProbableOutcomes => "Probable Outcomes Analysis",
            MunTask::Rebuttal => "Rebuttal Preparation",
            MunTask::Research => "Research Brief",
            MunTask::Speech => "Speech Outline",
            MunTask::Strategy => "Committee Strategy",
        }
    }

    pub fn sections(&self) -> &'static [Section] {
        match self {
            MunTask::Amendments => AMENDMENTS,
            MunTask::SituationAssessment => SITUATION_ASSESSMENT,
            MunTask::Directive => DIRECTIVE,
            MunTask::DraftResolution => DRAFT_RESOLUTION,
            MunTask::BackgroundGuide => BACKGROUND_GUIDE,
            MunTask::PointsAndRightOfReply => POINTS_AND_RIGHT_OF_REPLY,
            MunTask::PostAssessment => POST_ASSESSMENT,
            MunTask::ProbableOutcomes => PROBABLE_OUTCOMES,
            MunTask::Rebuttal => REBUTTAL,
            MunTask::Research => RESEARCH,
            MunTask::Speech => SPEECH,
            MunTask::Strategy => STRATEGY,
        }
    }

    pub fn render(&self, prompt: &str, amendment_prompt: Option<&str>) -> String {
        let mut out = format!("**{}**\n\nTopic: \"{}\"\n\n", self.heading(), prompt);

        if *self == MunTask::Amendments {
            if let Some(text) = amendment_prompt.map(str::trim).filter(|t| !t.is_empty()) {
                out.push_str(&format!("**Amendment Text Submitted**\n{text}\n\n"));
            }
        }

        for (index, section) in self.sections().iter().enumerate() {
            out.push_str(&format!("**{}. {}**\n{}\n\n", index + 1, section.heading, section.guidance));
        }

        out.truncate(out.trim_end().len());
        out
    }
}

/// Response text for `task`, falling back to a generic reply for task names
/// outside [`MunTask::ALL`].
pub fn render_response(task: &str, prompt: &str, amendment_prompt: Option<&str>) -> String {
    match MunTask::from_name(task) {
        Some(known) => known.render(prompt, amendment_prompt),
        None => format!("I'll help you with {task}. Here's my analysis of: {prompt}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_task_embeds_prompt_and_sections_in_order() {
        let prompt = "Climate refugees in the Sahel";
        for task in MunTask::ALL {
            let text = render_response(task.name(), prompt, None);
            assert!(text.contains(prompt), "{} lost the prompt", task.name());

            let mut cursor = 0;
            for section in task.sections() {
                let found = text[cursor..]
                    .find(section.heading)
                    .unwrap_or_else(|| panic!("{} missing '{}'", task.name(), section.heading));
                cursor += found + section.heading.len();
            }
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = render_response("speech", "Nuclear disarmament", None);
        let b = render_response("speech", "Nuclear disarmament", None);
        assert_eq!(a, b);
    }

    #[test]
    fn task_names_round_trip_and_are_distinct() {
        for task in MunTask::ALL {
            assert_eq!(MunTask::from_name(task.name()), Some(task));
        }
        let headings: std::collections::HashSet<&str> =
            MunTask::ALL.iter().map(|t| t.sections()[0].heading).collect();
        assert!(headings.len() > 1);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(MunTask::from_name("Research"), None);
        assert_eq!(MunTask::from_name("research"), Some(MunTask::Research));
    }

    #[test]
    fn unknown_task_uses_fallback() {
        let text = render_response("crisis note", "Seize the port", None);
        assert_eq!(text, "I'll help you with crisis note. Here's my analysis of: Seize the port");
    }

    #[test]
    fn empty_prompt_is_allowed() {
        let text = render_response("research", "", None);
        assert!(text.contains("Topic: \"\""));
    }

    #[test]
    fn amendment_text_only_rendered_for_amendments() {
        let with = render_response("amendments", "Clause 4", Some("Strike 'immediately'"));
        assert!(with.contains("Amendment Text Submitted"));
        assert!(with.contains("Strike 'immediately'"));

        let other = render_response("speech", "Clause 4", Some("Strike 'immediately'"));
        assert!(!other.contains("Strike 'immediately'"));
    }
}
