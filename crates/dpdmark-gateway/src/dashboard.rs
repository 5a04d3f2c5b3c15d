//! Static marketing dashboard: traffic chart plus scheduling and publishing forms.

const DASHBOARD_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>DPD Journals – Marketing Dashboard</title>
<meta name="description" content="Marketing dashboard: campaigns, posts and traffic.">
<style>
  body{font-family:Inter,system-ui,sans-serif;margin:0;background:#0b1020;color:#e8ebff}
  header{padding:20px 24px;border-bottom:1px solid #1b2340;background:#0e1530}
  h1{margin:0;font-size:21px}
  main{max-width:1100px;margin:0 auto;padding:24px;display:grid;gap:20px;grid-template-columns:1fr 1fr}
  section{background:#0f1736;border:1px solid #1d2a5b;border-radius:14px;padding:16px}
  section.wide{grid-column:1/-1}
  h2{margin:0 0 12px;font-size:17px}
  label{display:block;font-size:12px;color:#b8c1ff;margin-top:8px}
  input,textarea,select{width:100%;box-sizing:border-box;padding:9px;border-radius:10px;border:1px solid #263476;background:#0c1330;color:#fff}
  button{margin-top:12px;padding:9px 14px;border:0;border-radius:10px;background:#5a7cff;font-weight:700;cursor:pointer}
  .msg{font-size:12px;margin-left:8px;color:#9cffb6}
  .muted{font-size:12px;color:#94a3ff}
  @media (max-width:900px){main{grid-template-columns:1fr}}
</style>
</head>
<body>
<header>
  <h1>DPD Journals – Digital Marketing Dashboard</h1>
  <div class="muted">Traffic refreshes every 10s</div>
</header>
<main>
  <section class="wide">
    <h2>Traffic (last 14 days)</h2>
    <canvas id="traffic" height="110"></canvas>
  </section>

  <section>
    <h2>Schedule social post</h2>
    <label>Channel</label>
    <select id="social_channel"><option>X</option><option>LinkedIn</option><option>Facebook</option><option>Instagram</option></select>
    <label>When</label><input type="datetime-local" id="social_time">
    <label>Content</label>
    <textarea id="social_content" rows="3" placeholder="Include a UTM link such as /track?utm_source=linkedin&amp;utm_medium=social"></textarea>
    <button onclick="scheduleSocial()">Schedule</button><span id="social_msg" class="msg"></span>
  </section>

  <section>
    <h2>Schedule email</h2>
    <label>Subject</label><input id="email_subject">
    <label>When</label><input type="datetime-local" id="email_time">
    <label>To list</label><input id="email_list" placeholder="subscribers@dpd or a,b@example.com">
    <label>Body (HTML allowed)</label><textarea id="email_body" rows="3"></textarea>
    <button onclick="scheduleEmail()">Schedule</button><span id="email_msg" class="msg"></span>
  </section>

  <section class="wide">
    <h2>Publish blog post</h2>
    <label>Slug</label><input id="blog_slug" placeholder="ai-in-healthcare">
    <label>Title</label><input id="blog_title">
    <label>Body (HTML)</label><textarea id="blog_body" rows="6"></textarea>
    <button onclick="publishBlog()">Publish</button><span id="blog_msg" class="msg"></span>
    <div class="muted">Published posts appear at <code>/blog/&lt;slug&gt;</code>, in <code>/sitemap.xml</code> and in <code>/rss.xml</code>.</div>
  </section>
</main>

<script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
<script>
  let chart;
  async function drawChart() {
    const data = await (await fetch('/api/metrics/summary?days=14')).json();
    const ctx = document.getElementById('traffic').getContext('2d');
    if (chart) chart.destroy();
    chart = new Chart(ctx, {
      type: 'line',
      data: { labels: data.map(d => d.date), datasets: [{ label: 'Events', data: data.map(d => d.count) }] },
      options: { responsive: true, scales: { y: { beginAtZero: true } } }
    });
  }

  async function post(url, payload, msgId) {
    const r = await fetch(url, { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify(payload) });
    const res = await r.json().catch(() => ({}));
    document.getElementById(msgId).innerText = res.message || r.statusText;
  }

  function isoFrom(id) {
    const v = document.getElementById(id).value;
    return v ? new Date(v).toISOString() : '';
  }

  function scheduleSocial() {
    post('/api/schedule/social', {
      channel: document.getElementById('social_channel').value,
      content: document.getElementById('social_content').value,
      scheduled_at: isoFrom('social_time')
    }, 'social_msg');
  }

  function scheduleEmail() {
    post('/api/schedule/email', {
      subject: document.getElementById('email_subject').value,
      body: document.getElementById('email_body').value,
      to_list: document.getElementById('email_list').value,
      scheduled_at: isoFrom('email_time')
    }, 'email_msg');
  }

  function publishBlog() {
    post('/api/blog', {
      slug: document.getElementById('blog_slug').value,
      title: document.getElementById('blog_title').value,
      body: document.getElementById('blog_body').value
    }, 'blog_msg');
  }

  drawChart();
  setInterval(drawChart, 10000);
</script>
</body>
</html>
"#;

pub fn dashboard_html() -> &'static str {
    DASHBOARD_HTML
}
