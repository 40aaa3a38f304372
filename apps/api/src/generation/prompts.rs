// All LLM prompt constants for the Generation module.
// Placeholders are replaced literally (first occurrence, no escaping).

/// Cover letter prompt for a pasted job description.
/// Replace: {tone}, {resume}, {job_description}
pub const COVER_LETTER_FROM_TEXT: &str = r#"You are a world-class career coach. Write a concise, compelling, professional cover letter.

Tailor the letter to the job description below, drawing on the candidate's resume to highlight the most relevant skills and experience.

Instructions:
1. Read both documents carefully.
2. Identify the key skills, qualifications, and requirements in the job description.
3. Find concrete examples in the resume that demonstrate them.
4. Structure the letter:
   - Introduction: introduce the candidate and the position, and show interest in the role and the company.
   - Body: one or two paragraphs connecting the candidate's top two or three qualifications to the role's requirements. Use quantified achievements from the resume where available.
   - Conclusion: restate interest, express confidence, and close with a clear call to action.
5. Tone: {tone}

Do NOT include placeholders such as "[Your Name]" or "[Company Name]". The letter must be ready to sign.

Candidate resume:
---
RESUME:
{resume}
---

Job description:
---
JOB DESCRIPTION:
{job_description}
---

Return ONLY the body of the cover letter as plain text. No preamble, analysis, headings, or list of sources."#;

/// Cover letter prompt for a job posting URL. Requires the web search tool.
/// Replace: {tone}, {resume}, {job_url}
pub const COVER_LETTER_FROM_URL: &str = r#"You are a world-class career coach. Write a concise, compelling, professional cover letter.

First, act as a web researcher. You MUST read the page at the URL below to find the full job description, including its requirements, responsibilities, and qualifications.
URL: {job_url}

Then use that job description and the candidate's resume to write a cover letter that highlights the most relevant skills and experience.

Instructions:
1. Structure the letter:
   - Introduction: introduce the candidate and the position, and show interest in the role and the company.
   - Body: one or two paragraphs connecting the candidate's top two or three qualifications to the role's requirements. Use quantified achievements from the resume where available.
   - Conclusion: restate interest, express confidence, and close with a clear call to action.
2. Tone: {tone}

Do NOT include placeholders such as "[Your Name]" or "[Company Name]". The letter must be ready to sign.

Candidate resume:
---
RESUME:
{resume}
---

Find the job description at the URL and return ONLY the body of the cover letter as plain text. No preamble, analysis, headings, or list of sources."#;

/// Resume clean-up prompt for text extracted from an uploaded document.
/// Replace: {raw_text}
pub const RESUME_FORMAT_PROMPT: &str = r#"You are an expert resume formatter. Reformat the raw text below, extracted from a resume document, so it reads cleanly in a plain text editor.

Rules:
1. Identify logical sections such as Professional Summary, Work Experience, Education, Skills, and Projects.
2. Mark each section heading by surrounding it with three dashes, for example: --- Work Experience ---
3. Put one blank line between a heading and its content, and between separate entries such as different jobs or projects.
4. Use a hyphen (-) at the start of each bullet for lists of skills or responsibilities.
5. Preserve all original content. Do not add, remove, or reword anything; only restructure it.
6. Return a single block of plain text.

Raw text:
---
RAW TEXT:
{raw_text}
---

Return the formatted resume text only."#;
