//! Inline stylesheet and script of the exported document

pub const STYLE: &str = r#"
:root { --accent: #135bec; --muted: #64748b; --border: #e2e8f0; --bg: #f8fafc; }
* { box-sizing: border-box; }
body { margin: 0; font-family: -apple-system, "Segoe UI", Roboto, sans-serif; background: var(--bg); color: #0f172a; }
header { background: #fff; border-bottom: 1px solid var(--border); padding: 20px 32px; }
header h1 { margin: 0 0 4px; font-size: 28px; }
header .meta { color: var(--muted); font-size: 13px; }
main { max-width: 1280px; margin: 0 auto; padding: 24px 32px 64px; }
section { background: #fff; border: 1px solid var(--border); border-radius: 12px; padding: 20px; margin-bottom: 24px; }
section h2 { margin: 0 0 16px; font-size: 18px; }
table { width: 100%; border-collapse: collapse; font-size: 14px; }
th, td { text-align: left; padding: 8px 10px; border-bottom: 1px solid var(--border); vertical-align: top; }
th { background: var(--bg); font-size: 12px; text-transform: uppercase; letter-spacing: .04em; color: var(--muted); }
.filter-bar { display: flex; flex-wrap: wrap; gap: 6px; margin-bottom: 12px; }
.filter-bar button { border: 1px solid var(--border); background: #fff; border-radius: 999px; padding: 4px 12px; cursor: pointer; font-size: 13px; }
.filter-bar button.active { background: var(--accent); border-color: var(--accent); color: #fff; }
.hidden { display: none !important; }
.empty { color: var(--muted); font-style: italic; }
.details-btn { border: 1px solid var(--accent); color: var(--accent); background: #fff; border-radius: 6px; padding: 2px 10px; cursor: pointer; }
.detail-content { display: none; }
.detail-content img, .comment img { max-width: 100%; border-radius: 6px; margin-top: 8px; }
.settings-matrix td.on { color: #15803d; font-weight: 600; }
.settings-matrix td.off { color: #b91c1c; }
.email-item { border: 1px solid var(--border); border-radius: 8px; margin-bottom: 8px; }
.email-head { display: flex; justify-content: space-between; gap: 12px; padding: 10px 14px; cursor: pointer; }
.email-head .subject { font-weight: 600; }
.email-head .from { color: var(--muted); font-size: 13px; }
.email-body { padding: 10px 14px; border-top: 1px solid var(--border); overflow-x: auto; }
.comment { border-bottom: 1px solid var(--border); padding: 12px 0; }
.comment .meta { color: var(--muted); font-size: 12px; margin-bottom: 6px; }
.tag { display: inline-block; border-radius: 999px; padding: 1px 8px; font-size: 11px; background: #e0e7ff; margin-right: 4px; }
.modal { position: fixed; inset: 0; background: rgba(15, 23, 42, .55); display: flex; align-items: center; justify-content: center; }
.modal-dialog { background: #fff; border-radius: 12px; max-width: 720px; width: 92%; max-height: 85vh; overflow-y: auto; padding: 20px 24px; position: relative; }
.modal-close { position: absolute; top: 10px; right: 14px; border: none; background: none; font-size: 22px; cursor: pointer; }
"#;

pub const SCRIPT: &str = r#"
(function () {
  function bindFilterBar(barId, onSelect) {
    var bar = document.getElementById(barId);
    if (!bar) return;
    bar.addEventListener('click', function (event) {
      var button = event.target.closest('button[data-value]');
      if (!button) return;
      bar.querySelectorAll('button').forEach(function (b) { b.classList.remove('active'); });
      button.classList.add('active');
      onSelect(button.getAttribute('data-value'));
    });
  }

  // the "All" button carries an empty value, which no option can have
  function matches(selected, value) {
    return selected === '' || selected === value;
  }

  bindFilterBar('bonus-geo-filter', function (geo) {
    document.querySelectorAll('tr.bonus-row').forEach(function (row) {
      row.classList.toggle('hidden', !matches(geo, row.getAttribute('data-geo')));
    });
  });

  var paymentFilter = { geo: '', direction: '' };
  function applyPaymentFilter() {
    document.querySelectorAll('tr.payment-row').forEach(function (row) {
      var visible = matches(paymentFilter.geo, row.getAttribute('data-geo')) &&
        matches(paymentFilter.direction, row.getAttribute('data-direction'));
      row.classList.toggle('hidden', !visible);
    });
  }
  bindFilterBar('payment-geo-filter', function (geo) {
    paymentFilter.geo = geo;
    applyPaymentFilter();
  });
  bindFilterBar('payment-direction-filter', function (direction) {
    paymentFilter.direction = direction;
    applyPaymentFilter();
  });

  bindFilterBar('settings-geo-switch', function (geo) {
    document.querySelectorAll('table.settings-matrix').forEach(function (table) {
      table.classList.toggle('hidden', table.getAttribute('data-geo') !== geo);
    });
  });

  bindFilterBar('email-recipient-filter', function (recipient) {
    document.querySelectorAll('.email-item').forEach(function (item) {
      item.classList.toggle('hidden', !matches(recipient, item.getAttribute('data-recipient')));
    });
  });

  document.querySelectorAll('.email-item .email-head').forEach(function (head) {
    head.addEventListener('click', function () {
      var body = head.parentElement.querySelector('.email-body');
      if (body) body.classList.toggle('hidden');
    });
  });

  var modal = document.getElementById('detail-modal');
  var modalBody = document.getElementById('modal-body');
  function closeModal() {
    modal.classList.add('hidden');
    modalBody.innerHTML = '';
  }
  document.querySelectorAll('button.details-btn').forEach(function (button) {
    button.addEventListener('click', function () {
      var source = document.getElementById(button.getAttribute('data-target'));
      if (!source) return;
      modalBody.innerHTML = source.innerHTML;
      modal.classList.remove('hidden');
    });
  });
  modal.addEventListener('click', function (event) {
    if (event.target === modal || event.target.classList.contains('modal-close')) closeModal();
  });
  document.addEventListener('keydown', function (event) {
    if (event.key === 'Escape') closeModal();
  });
})();
"#;
